//! Simulator configuration.
//!
//! Every field has a default, so hosts only spell out what they change:
//!
//! ```
//! use qkd_sim::SimulatorConfig;
//!
//! let config = SimulatorConfig::from_json(r#"{ "seed": 42, "channel": { "noise_level": 0.0 } }"#).unwrap();
//! assert_eq!(config.seed, Some(42));
//! assert_eq!(config.qubit_count, 1024);
//! ```

use crate::core::channels::QuantumChannel;
use crate::core::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// BB84 intercept-resend security threshold on the quantum bit error rate.
pub const DEFAULT_SECURITY_THRESHOLD: f64 = 0.11;
/// Maximum number of sifted positions disclosed for error estimation.
pub const DEFAULT_ERROR_SAMPLE_SIZE: usize = 50;
/// Length of the privacy-amplified key in bits.
pub const DEFAULT_FINAL_KEY_LENGTH: usize = 128;
/// Measurements per angle combination in the Bell test.
pub const DEFAULT_BELL_SHOTS: usize = 100;

/// Physical parameters of the quantum channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Probability that a qubit picks up rotation noise
    pub noise_level: f64,
    /// Nominal decoherence time of the link in seconds
    pub decoherence_time: f64,
    pub fidelity: f64,
    /// Qubits per transmission the link is rated for
    pub channel_capacity: usize,
    pub quantum_error_rate: f64,
    /// Per-qubit probability of an intercept-resend attack
    pub eavesdrop_probability: f64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            noise_level: 0.02,
            decoherence_time: 0.1,
            fidelity: 0.98,
            channel_capacity: 1000,
            quantum_error_rate: 0.001,
            eavesdrop_probability: 0.005,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Size of the random qubit pool built at start-up
    pub qubit_count: usize,
    /// Number of entangled pairs built at start-up
    pub entangled_pairs: usize,
    pub channel: ChannelConfig,
    pub security_threshold: f64,
    pub error_sample_size: usize,
    pub final_key_length: usize,
    pub bell_shots: usize,
    /// Fixed seed for reproducible runs; `None` draws from the OS
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            qubit_count: 1024,
            entangled_pairs: 512,
            channel: ChannelConfig::default(),
            security_threshold: DEFAULT_SECURITY_THRESHOLD,
            error_sample_size: DEFAULT_ERROR_SAMPLE_SIZE,
            final_key_length: DEFAULT_FINAL_KEY_LENGTH,
            bell_shots: DEFAULT_BELL_SHOTS,
            seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Parses a JSON document and validates the result.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimulatorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_channel(mut self, channel: ChannelConfig) -> Self {
        self.channel = channel;
        self
    }

    /// Checks every field without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=0.5).contains(&self.security_threshold) {
            return Err(ConfigError::InvalidThreshold(self.security_threshold));
        }
        if self.error_sample_size == 0 {
            return Err(ConfigError::ZeroValue {
                field: "error_sample_size",
            });
        }
        if self.final_key_length == 0 {
            return Err(ConfigError::ZeroValue {
                field: "final_key_length",
            });
        }
        if self.bell_shots == 0 {
            return Err(ConfigError::ZeroValue {
                field: "bell_shots",
            });
        }

        QuantumChannel::new(&self.channel)?;
        Ok(())
    }
}
