pub(crate) mod channels;
pub(crate) mod entanglement;
pub mod errors;
pub(crate) mod qubit;
pub mod utils;

pub use channels::{QuantumChannel, Transmission, TransmissionStats};
pub use entanglement::{BellState, EntangledPair, create_entangled_pairs};
pub use qubit::{Basis, Qubit};
