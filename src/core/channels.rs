use crate::config::ChannelConfig;
use crate::core::errors::ChannelError;
use crate::core::qubit::{Basis, Qubit};
use rand::Rng;
use serde::Serialize;
use tracing::trace;

/// Bound on the noise rotation angle, scaled by the noise level.
const MAX_NOISE_ROTATION: f64 = 0.05;
/// Amplitude factor applied when transmission outlasts coherence.
const DECOHERENCE_DAMPING: f64 = 0.9;
const MIN_TRANSMISSION_TIME: f64 = 0.001;
const MAX_TRANSMISSION_TIME: f64 = 0.01;

/// Simulated optical link between the two parties.
///
/// Immutable once built; every constructor validates its parameters so that
/// sampling with them cannot panic.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuantumChannel {
    noise_level: f64,
    decoherence_time: f64,
    fidelity: f64,
    channel_capacity: usize,
    quantum_error_rate: f64,
    eavesdrop_probability: f64,
}

/// Counters describing what happened to one batch of qubits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TransmissionStats {
    pub noised: usize,
    pub decohered: usize,
    pub intercepted: usize,
}

/// Output of [`QuantumChannel::transmit`]: the qubits in input order plus stats.
#[derive(Clone, Debug)]
pub struct Transmission {
    pub qubits: Vec<Qubit>,
    pub stats: TransmissionStats,
}

impl QuantumChannel {
    pub fn new(config: &ChannelConfig) -> Result<Self, ChannelError> {
        validate_prob(config.noise_level)?;
        validate_prob(config.fidelity)?;
        validate_prob(config.quantum_error_rate)?;
        validate_prob(config.eavesdrop_probability)?;

        if !config.decoherence_time.is_finite() || config.decoherence_time <= 0.0 {
            return Err(ChannelError::InvalidDuration(config.decoherence_time));
        }
        if config.channel_capacity == 0 {
            return Err(ChannelError::InvalidCapacity);
        }

        Ok(Self {
            noise_level: config.noise_level,
            decoherence_time: config.decoherence_time,
            fidelity: config.fidelity,
            channel_capacity: config.channel_capacity,
            quantum_error_rate: config.quantum_error_rate,
            eavesdrop_probability: config.eavesdrop_probability,
        })
    }

    /// Perfect link: no noise, no eavesdropper, unit fidelity.
    pub fn noiseless() -> Self {
        Self {
            noise_level: 0.0,
            fidelity: 1.0,
            quantum_error_rate: 0.0,
            eavesdrop_probability: 0.0,
            ..Self::default()
        }
    }

    pub fn noise_level(&self) -> f64 {
        self.noise_level
    }

    pub fn decoherence_time(&self) -> f64 {
        self.decoherence_time
    }

    pub fn fidelity(&self) -> f64 {
        self.fidelity
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    pub fn quantum_error_rate(&self) -> f64 {
        self.quantum_error_rate
    }

    pub fn eavesdrop_probability(&self) -> f64 {
        self.eavesdrop_probability
    }

    /// Sends qubits through the channel, one at a time and independently.
    ///
    /// Each qubit may be rotated by noise, damped if the sampled flight time
    /// exceeds its coherence window, and finally intercepted by an
    /// eavesdropper who measures it in a random basis and forwards a freshly
    /// prepared qubit carrying what she saw.
    pub fn transmit<R: Rng + ?Sized>(&self, qubits: Vec<Qubit>, rng: &mut R) -> Transmission {
        let mut stats = TransmissionStats::default();

        let mut transmitted = Vec::with_capacity(qubits.len());

        for (index, mut qubit) in qubits.into_iter().enumerate() {
            if rng.random_bool(self.noise_level) {
                let angle =
                    rng.random_range(-MAX_NOISE_ROTATION..=MAX_NOISE_ROTATION) * self.noise_level;
                qubit.rotate(angle);
                stats.noised += 1;
            }

            let transmission_time = rng.random_range(MIN_TRANSMISSION_TIME..=MAX_TRANSMISSION_TIME);
            if transmission_time > qubit.coherence_time {
                qubit.dampen(DECOHERENCE_DAMPING);
                stats.decohered += 1;
            }

            // Intercept-resend
            if rng.random_bool(self.eavesdrop_probability) {
                let eve_basis = Basis::random(rng);
                let eve_bit = qubit.measure(eve_basis, rng);
                trace!(index, ?eve_basis, eve_bit, "qubit intercepted");
                stats.intercepted += 1;
                qubit = Qubit::prepare(eve_bit, eve_basis, rng);
            }

            transmitted.push(qubit);
        }

        Transmission {
            qubits: transmitted,
            stats,
        }
    }
}

impl Default for QuantumChannel {
    fn default() -> Self {
        let config = ChannelConfig::default();
        Self {
            noise_level: config.noise_level,
            decoherence_time: config.decoherence_time,
            fidelity: config.fidelity,
            channel_capacity: config.channel_capacity,
            quantum_error_rate: config.quantum_error_rate,
            eavesdrop_probability: config.eavesdrop_probability,
        }
    }
}

/// Validate probability parameter
fn validate_prob(p: f64) -> Result<(), ChannelError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ChannelError::InvalidProbability(p));
    }
    Ok(())
}
