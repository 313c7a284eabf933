//! Parity-based error correction stand-in.
//!
//! This is a stochastic simulation, not syndrome decoding: bits are flipped
//! at the estimated error rate, which may introduce as many errors as it
//! removes.

use crate::config::DEFAULT_SECURITY_THRESHOLD;
use crate::core::utils::{parity, ratio_or};
use rand::Rng;
use serde::Serialize;
use tracing::debug;

#[derive(Clone, Debug, Serialize)]
pub struct ErrorCorrector {
    threshold: f64,
    corrected_errors: usize,
    uncorrectable_errors: usize,
}

impl Default for ErrorCorrector {
    fn default() -> Self {
        Self::new(DEFAULT_SECURITY_THRESHOLD)
    }
}

impl ErrorCorrector {
    /// `threshold` is the highest error rate the corrector accepts.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            corrected_errors: 0,
            uncorrectable_errors: 0,
        }
    }

    pub fn corrected_errors(&self) -> usize {
        self.corrected_errors
    }

    pub fn uncorrectable_errors(&self) -> usize {
        self.uncorrectable_errors
    }

    /// `corrected / (corrected + uncorrectable)`, or 1.0 before any error was seen.
    pub fn efficiency(&self) -> f64 {
        let corrected = self.corrected_errors as f64;
        let total = corrected + self.uncorrectable_errors as f64;
        ratio_or(corrected, total, 1.0)
    }

    /// Runs one correction pass over `key`.
    ///
    /// Above the threshold, or for a NaN rate, the key is rejected and an
    /// empty vector returned; the estimated number of errors in it is booked
    /// as uncorrectable.
    /// Otherwise the key is walked two bits at a time and, with probability
    /// `error_rate`, the bit selected by the pair's parity is flipped.
    pub fn correct<R: Rng + ?Sized>(&mut self, key: &[bool], error_rate: f64, rng: &mut R) -> Vec<bool> {
        if error_rate.is_nan() || error_rate > self.threshold {
            let lost = (key.len() as f64 * error_rate).round() as usize;
            self.uncorrectable_errors += lost.max(1);
            debug!(error_rate, lost, "key rejected by error correction");
            return Vec::new();
        }

        let flip_probability = error_rate.clamp(0.0, 1.0);
        let mut corrected = key.to_vec();
        let mut flips = 0;

        for (block, pair) in corrected.chunks_mut(2).enumerate() {
            let offset = usize::from(parity(pair)).min(pair.len() - 1);
            if rng.random_bool(flip_probability) {
                pair[offset] = !pair[offset];
                flips += 1;
                debug!(block, offset, "parity block adjusted");
            }
        }

        self.corrected_errors += flips;
        corrected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn empty_key_stays_empty() {
        let mut rng = StdRng::seed_from_u64(31);
        let mut corrector = ErrorCorrector::default();
        assert!(corrector.correct(&[], 0.0, &mut rng).is_empty());
        assert_eq!(corrector.efficiency(), 1.0);
    }

    #[test]
    fn zero_error_rate_is_identity() {
        let mut rng = StdRng::seed_from_u64(32);
        let mut corrector = ErrorCorrector::default();
        let key: Vec<bool> = (0..101).map(|i| i % 3 == 0).collect();
        assert_eq!(corrector.correct(&key, 0.0, &mut rng), key);
        assert_eq!(corrector.corrected_errors(), 0);
    }

    #[test]
    fn above_threshold_rejects_key() {
        let mut rng = StdRng::seed_from_u64(33);
        let mut corrector = ErrorCorrector::default();
        let key = vec![true; 40];
        assert!(corrector.correct(&key, 0.25, &mut rng).is_empty());
        assert_eq!(corrector.uncorrectable_errors(), 10);
        assert_eq!(corrector.efficiency(), 0.0);
    }

    #[test]
    fn threshold_itself_is_accepted() {
        let mut rng = StdRng::seed_from_u64(34);
        let mut corrector = ErrorCorrector::default();
        let key = vec![false; 64];
        assert_eq!(corrector.correct(&key, 0.11, &mut rng).len(), 64);
    }

    #[test]
    fn nan_error_rate_rejects_key() {
        let mut rng = StdRng::seed_from_u64(36);
        let mut corrector = ErrorCorrector::default();
        assert!(corrector.correct(&[true, false], f64::NAN, &mut rng).is_empty());
        assert_eq!(corrector.uncorrectable_errors(), 1);
        assert_eq!(corrector.corrected_errors(), 0);

        // negative rates clamp to zero flips
        let key = vec![true; 8];
        assert_eq!(corrector.correct(&key, -0.5, &mut rng), key);
    }

    #[test]
    fn flips_track_error_rate() {
        let mut rng = StdRng::seed_from_u64(35);
        let mut corrector = ErrorCorrector::default();
        let key = vec![false; 2000];
        let out = corrector.correct(&key, 0.1, &mut rng);

        let changed = key.iter().zip(&out).filter(|(a, b)| a != b).count();
        assert_eq!(changed, corrector.corrected_errors());
        // 1000 pairs at 10%
        assert!((60..=140).contains(&changed), "changed = {changed}");
        assert_eq!(corrector.efficiency(), 1.0);
    }
}
