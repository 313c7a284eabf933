mod config;
mod core;
pub mod metrics;
pub mod protocols;
mod sampler;
mod simulator;

pub use crate::config::{ChannelConfig, SimulatorConfig};
pub use crate::core::{
    Basis, BellState, EntangledPair, QuantumChannel, Qubit, Transmission, TransmissionStats,
    create_entangled_pairs, errors, utils,
};
pub use crate::metrics::{Metrics, Report, SecurityAssessment};
pub use crate::protocols::bell::BellResult;
pub use crate::protocols::qkd::bb84::{Bb84Result, Bb84Session};
pub use crate::sampler::Sampler;
pub use crate::simulator::QkdSimulator;
