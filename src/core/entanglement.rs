//! Entangled pair generation.
//!
//! Pairs are *tagged* with a Bell state rather than carrying a joint
//! two-qubit state vector: each side gets a single real amplitude pair that
//! correlates with its partner by construction.

use crate::core::qubit::{Basis, Qubit};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_SQRT_2;

/// Lower bound of the sampled entanglement strength.
pub const MIN_ENTANGLEMENT_STRENGTH: f64 = 0.85;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BellState {
    PhiPlus,
    PhiMinus,
    PsiPlus,
    PsiMinus,
}

impl BellState {
    pub const ALL: [BellState; 4] = [
        BellState::PhiPlus,
        BellState::PhiMinus,
        BellState::PsiPlus,
        BellState::PsiMinus,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Canonical `((alice_alpha, alice_beta), (bob_alpha, bob_beta))`.
    pub fn amplitudes(self) -> ((f64, f64), (f64, f64)) {
        let h = FRAC_1_SQRT_2;
        match self {
            BellState::PhiPlus => ((h, 0.0), (0.0, h)),
            BellState::PhiMinus => ((h, 0.0), (0.0, -h)),
            BellState::PsiPlus => ((0.0, h), (h, 0.0)),
            BellState::PsiMinus => ((0.0, h), (-h, 0.0)),
        }
    }
}

/// A pair exclusively owning both of its qubits.
#[derive(Clone, Debug, Serialize)]
pub struct EntangledPair {
    pub alice: Qubit,
    pub bob: Qubit,
    pub bell_state: BellState,
    /// In `[MIN_ENTANGLEMENT_STRENGTH, 1.0]`
    pub entanglement_strength: f64,
    pub measured: bool,
}

impl EntangledPair {
    pub fn new<R: Rng + ?Sized>(bell_state: BellState, rng: &mut R) -> Self {
        let ((a_alpha, a_beta), (b_alpha, b_beta)) = bell_state.amplitudes();

        Self {
            alice: Qubit::from_amplitudes(a_alpha, a_beta, Basis::Rectilinear, rng),
            bob: Qubit::from_amplitudes(b_alpha, b_beta, Basis::Rectilinear, rng),
            bell_state,
            entanglement_strength: rng.random_range(MIN_ENTANGLEMENT_STRENGTH..=1.0),
            measured: false,
        }
    }
}

/// Creates `count` pairs with uniformly chosen Bell states.
pub fn create_entangled_pairs<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<EntangledPair> {
    (0..count)
        .map(|_| {
            let state = BellState::random(rng);
            EntangledPair::new(state, rng)
        })
        .collect()
}
