use crate::config::DEFAULT_BELL_SHOTS;
use crate::core::qubit::Qubit;
use rand::Rng;

/// Repeated ±1 measurements of qubits along analyser angles.
///
/// Each shot is independent and leaves the qubit untouched; the sampler only
/// reads amplitudes, so the same pair can feed every angle combination.
#[derive(Debug, Clone, Copy)]
pub struct Sampler {
    /// Number of shots per angle combination.
    pub shots: usize,
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(DEFAULT_BELL_SHOTS)
    }
}

impl Sampler {
    pub fn new(shots: usize) -> Self {
        Self { shots }
    }

    /// Probability of a +1 outcome: $|\alpha \cos\theta + \beta \sin\theta|^2$, clamped to `[0, 1]`.
    pub fn plus_probability(qubit: &Qubit, angle: f64) -> f64 {
        let amplitude = qubit.alpha * angle.cos() + qubit.beta * angle.sin();
        (amplitude * amplitude).clamp(0.0, 1.0)
    }

    /// A single ±1 outcome for `qubit` along `angle` (radians).
    pub fn outcome<R: Rng + ?Sized>(qubit: &Qubit, angle: f64, rng: &mut R) -> i8 {
        if rng.random_bool(Self::plus_probability(qubit, angle)) {
            1
        } else {
            -1
        }
    }

    /// Correlation $E(a, b)$: the mean of `shots` outcome products.
    ///
    /// Returns 0 when configured with zero shots.
    pub fn correlation<R: Rng + ?Sized>(
        &self,
        alice: &Qubit,
        bob: &Qubit,
        alice_angle: f64,
        bob_angle: f64,
        rng: &mut R,
    ) -> f64 {
        if self.shots == 0 {
            return 0.0;
        }

        let mut sum = 0i64;
        for _ in 0..self.shots {
            let a = Self::outcome(alice, alice_angle, rng);
            let b = Self::outcome(bob, bob_angle, rng);
            sum += i64::from(a * b);
        }

        sum as f64 / self.shots as f64
    }
}
