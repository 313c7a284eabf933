//! Quantum Key Distribution (QKD).
//!
//! The BB84 pipeline and its classical post-processing stages:
//! - **bb84**: preparation, transmission, sifting and error estimation.
//! - **error_correction**: parity-driven stochastic correction of the sifted key.
//! - **privacy_amplification**: universal hashing plus SHA-256 compression.

pub mod bb84;
pub mod error_correction;
pub mod privacy_amplification;
