//! Privacy amplification.
//!
//! Each key bit goes through a member of the universal family
//! $h_{a,b}(x) = ((a x + b) \bmod p) \bmod 2$, the resulting bit string is
//! digested with SHA-256, and the final key is read MSB-first out of the
//! digest.

use crate::config::DEFAULT_FINAL_KEY_LENGTH;
use crate::core::utils::bits_to_string;
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Mersenne prime $2^{31} - 1$, the modulus of the hash family.
pub const HASH_PRIME: u64 = 2_147_483_647;

/// One `(a, b, p)` member of the universal hash family.
///
/// Always satisfies `p >= 2`, `1 <= a < p` and `b < p`, so hashing never
/// divides by zero or overflows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct UniversalHash {
    a: u64,
    b: u64,
    p: u64,
}

impl Default for UniversalHash {
    fn default() -> Self {
        Self {
            a: 1_103_515_245,
            b: 12_345,
            p: HASH_PRIME,
        }
    }
}

impl UniversalHash {
    /// Returns `None` unless `p >= 2`, `1 <= a < p` and `b < p`.
    pub fn new(a: u64, b: u64, p: u64) -> Option<Self> {
        (p >= 2 && (1..p).contains(&a) && b < p).then_some(Self { a, b, p })
    }

    pub fn a(&self) -> u64 {
        self.a
    }

    pub fn b(&self) -> u64 {
        self.b
    }

    pub fn p(&self) -> u64 {
        self.p
    }

    pub fn hash_bit(&self, bit: bool) -> bool {
        let x = u128::from(bit);
        let value = (u128::from(self.a) * x + u128::from(self.b)) % u128::from(self.p);
        value % 2 == 1
    }
}

/// Pre-generated members of the hash family.
#[derive(Clone, Debug, Serialize)]
pub struct UniversalHashFamily {
    members: Vec<UniversalHash>,
}

impl UniversalHashFamily {
    /// Draws `size` members with `a ∈ [1, p)` and `b ∈ [0, p)`.
    pub fn generate<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        let members = (0..size)
            .map(|_| UniversalHash {
                a: rng.random_range(1..HASH_PRIME),
                b: rng.random_range(0..HASH_PRIME),
                p: HASH_PRIME,
            })
            .collect();
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<UniversalHash> {
        self.members.get(index).copied()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PrivacyAmplifier {
    hash: UniversalHash,
    final_key_length: usize,
}

impl Default for PrivacyAmplifier {
    fn default() -> Self {
        Self::new(UniversalHash::default(), DEFAULT_FINAL_KEY_LENGTH)
    }
}

impl PrivacyAmplifier {
    pub fn new(hash: UniversalHash, final_key_length: usize) -> Self {
        Self {
            hash,
            final_key_length,
        }
    }

    /// Uses the first member of `family`, falling back to the default triple.
    pub fn from_family(family: &UniversalHashFamily, final_key_length: usize) -> Self {
        let hash = family.get(0).unwrap_or_default();
        Self::new(hash, final_key_length)
    }

    pub fn hash(&self) -> UniversalHash {
        self.hash
    }

    pub fn final_key_length(&self) -> usize {
        self.final_key_length
    }

    /// Compresses `key` into at most `final_key_length` bits.
    ///
    /// The output stops early once the 256 digest bits run out, so it is
    /// never longer than `min(final_key_length, 256)`. An empty key yields an
    /// empty output.
    pub fn amplify(&self, key: &[bool]) -> Vec<bool> {
        if key.is_empty() {
            return Vec::new();
        }

        let hashed: Vec<bool> = key.iter().map(|&bit| self.hash.hash_bit(bit)).collect();
        let digest = Sha256::digest(bits_to_string(&hashed).as_bytes());

        (0..self.final_key_length)
            .take_while(|i| i / 8 < digest.len())
            .map(|i| (digest[i / 8] >> (7 - i % 8)) & 1 == 1)
            .collect()
    }
}
