use crate::core::utils::monotonic_seconds;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_1_SQRT_2, TAU};

/// Lower bound of a freshly created qubit's coherence window, in seconds.
pub const MIN_COHERENCE_TIME: f64 = 0.05;
/// Upper bound of a freshly created qubit's coherence window, in seconds.
pub const MAX_COHERENCE_TIME: f64 = 0.5;

/// Preparation / measurement basis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    /// {|0>, |1>}
    Rectilinear,
    /// {|+>, |->}
    Diagonal,
}

impl Basis {
    /// Uniformly random basis.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.random_bool(0.5) {
            Basis::Diagonal
        } else {
            Basis::Rectilinear
        }
    }
}

/// A simulated two-level system described by a real amplitude pair.
///
/// Collapse state is private: the only way to set it is [`Qubit::measure`],
/// which keeps the first outcome forever.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Qubit {
    /// Amplitude of |0>
    pub alpha: f64,
    /// Amplitude of |1>
    pub beta: f64,
    /// Auxiliary phase in radians
    pub phase: f64,
    /// Basis the qubit was prepared in
    pub basis: Basis,
    /// Monotonic creation timestamp in seconds
    pub creation_time: f64,
    /// Seconds the qubit stays coherent after creation
    pub coherence_time: f64,
    measured: bool,
    measurement_result: Option<bool>,
    measurement_basis: Option<Basis>,
}

impl Qubit {
    fn with_amplitudes(alpha: f64, beta: f64, phase: f64, basis: Basis, coherence_time: f64) -> Self {
        Self {
            alpha,
            beta,
            phase,
            basis,
            creation_time: monotonic_seconds(),
            coherence_time,
            measured: false,
            measurement_result: None,
            measurement_basis: None,
        }
    }

    /// Creates a qubit in a random state on the real unit circle.
    ///
    /// The basis tag is uniform, $\alpha = \cos\theta$ and $\beta = \sin\theta$
    /// for $\theta \in [0, 2\pi)$, and the coherence window is drawn from
    /// `[MIN_COHERENCE_TIME, MAX_COHERENCE_TIME]`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let basis = Basis::random(rng);
        let theta = rng.random_range(0.0..TAU);
        let phase = rng.random_range(0.0..TAU);
        let coherence_time = random_coherence_time(rng);

        Self::with_amplitudes(theta.cos(), theta.sin(), phase, basis, coherence_time)
    }

    /// Prepares the canonical BB84 state encoding `bit` in `basis`.
    ///
    /// Measuring the result in the same basis returns `bit` with certainty
    /// as long as the channel leaves it untouched.
    pub fn prepare<R: Rng + ?Sized>(bit: bool, basis: Basis, rng: &mut R) -> Self {
        let (alpha, beta) = match (basis, bit) {
            (Basis::Rectilinear, false) => (1.0, 0.0),
            (Basis::Rectilinear, true) => (0.0, 1.0),
            (Basis::Diagonal, false) => (FRAC_1_SQRT_2, FRAC_1_SQRT_2),
            (Basis::Diagonal, true) => (FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
        };

        Self::with_amplitudes(alpha, beta, 0.0, basis, random_coherence_time(rng))
    }

    /// Builds a qubit with explicit amplitudes. Used by the pair generator.
    pub fn from_amplitudes<R: Rng + ?Sized>(alpha: f64, beta: f64, basis: Basis, rng: &mut R) -> Self {
        Self::with_amplitudes(alpha, beta, 0.0, basis, random_coherence_time(rng))
    }

    pub fn is_measured(&self) -> bool {
        self.measured
    }

    pub fn measurement_result(&self) -> Option<bool> {
        self.measurement_result
    }

    pub fn measurement_basis(&self) -> Option<Basis> {
        self.measurement_basis
    }

    /// $|\alpha|^2 + |\beta|^2$. Equal to 1 at creation, smaller after damping.
    pub fn norm_squared(&self) -> f64 {
        self.alpha * self.alpha + self.beta * self.beta
    }

    /// Probability of outcome 0 for a projective measurement in `basis`.
    ///
    /// Amplitudes are renormalised first so damping does not bias the result.
    pub fn probability_zero(&self, basis: Basis) -> f64 {
        let norm = self.norm_squared();
        if norm < 1e-12 {
            return 0.5;
        }

        let p = match basis {
            Basis::Rectilinear => self.alpha * self.alpha / norm,
            Basis::Diagonal => {
                let plus = self.alpha + self.beta;
                plus * plus / (2.0 * norm)
            }
        };
        p.clamp(0.0, 1.0)
    }

    /// Measures the qubit, collapsing it on first use.
    ///
    /// A matching basis performs an ideal projective measurement; a
    /// mismatched basis gives a fair coin. Later calls return the first
    /// outcome regardless of `basis`.
    pub fn measure<R: Rng + ?Sized>(&mut self, basis: Basis, rng: &mut R) -> bool {
        if let Some(result) = self.measurement_result {
            return result;
        }

        let result = if basis == self.basis {
            let roll: f64 = rng.random();
            roll >= self.probability_zero(basis)
        } else {
            rng.random_bool(0.5)
        };

        self.measured = true;
        self.measurement_result = Some(result);
        self.measurement_basis = Some(basis);

        result
    }

    /// Standard 2D rotation of the amplitude pair.
    pub fn rotate(&mut self, angle: f64) {
        let (sin, cos) = angle.sin_cos();
        let alpha = self.alpha * cos - self.beta * sin;
        let beta = self.alpha * sin + self.beta * cos;
        self.alpha = alpha;
        self.beta = beta;
    }

    /// Scales both amplitudes by `factor`.
    pub fn dampen(&mut self, factor: f64) {
        self.alpha *= factor;
        self.beta *= factor;
    }

    /// Not yet measured and still inside its coherence window at `now`.
    pub fn is_coherent(&self, now: f64) -> bool {
        !self.measured && now - self.creation_time <= self.coherence_time
    }
}

fn random_coherence_time<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random_range(MIN_COHERENCE_TIME..=MAX_COHERENCE_TIME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn random_qubit_is_normalised() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let q = Qubit::random(&mut rng);
            assert_relative_eq!(q.norm_squared(), 1.0, epsilon = 1e-12);
            assert!((MIN_COHERENCE_TIME..=MAX_COHERENCE_TIME).contains(&q.coherence_time));
            assert!(!q.is_measured());
            assert!(q.measurement_result().is_none());
        }
    }

    #[test]
    fn prepared_amplitudes() {
        let mut rng = StdRng::seed_from_u64(1);
        let q = Qubit::prepare(true, Basis::Diagonal, &mut rng);
        assert_relative_eq!(q.alpha, FRAC_1_SQRT_2);
        assert_relative_eq!(q.beta, -FRAC_1_SQRT_2);
        assert_eq!(q.basis, Basis::Diagonal);

        let q = Qubit::prepare(false, Basis::Rectilinear, &mut rng);
        assert_eq!((q.alpha, q.beta), (1.0, 0.0));
    }

    #[test]
    fn matching_basis_recovers_bit() {
        let mut rng = StdRng::seed_from_u64(2);
        for bit in [false, true] {
            for basis in [Basis::Rectilinear, Basis::Diagonal] {
                for _ in 0..200 {
                    let mut q = Qubit::prepare(bit, basis, &mut rng);
                    assert_eq!(q.measure(basis, &mut rng), bit);
                }
            }
        }
    }

    #[test]
    fn mismatched_basis_is_a_coin_flip() {
        let mut rng = StdRng::seed_from_u64(3);
        let ones = (0..2000)
            .filter(|_| {
                let mut q = Qubit::prepare(false, Basis::Rectilinear, &mut rng);
                q.measure(Basis::Diagonal, &mut rng)
            })
            .count();
        assert!((800..1200).contains(&ones), "ones = {ones}");
    }

    #[test]
    fn measurement_is_cached() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut q = Qubit::random(&mut rng);
        let first = q.measure(Basis::Diagonal, &mut rng);
        for _ in 0..20 {
            assert_eq!(q.measure(Basis::Rectilinear, &mut rng), first);
        }
        assert_eq!(q.measurement_basis(), Some(Basis::Diagonal));
        assert!(!q.is_coherent(q.creation_time));
    }

    #[test]
    fn rotation_preserves_norm_and_damping_shrinks_it() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut q = Qubit::prepare(false, Basis::Diagonal, &mut rng);
        q.rotate(0.3);
        assert_relative_eq!(q.norm_squared(), 1.0, epsilon = 1e-12);
        q.dampen(0.9);
        assert_relative_eq!(q.norm_squared(), 0.81, epsilon = 1e-12);
        // renormalised probabilities stay in range
        let p = q.probability_zero(Basis::Diagonal);
        assert!((0.0..=1.0).contains(&p));
    }
}
