//! Quantum Cryptography Protocols.
//!
//! This module contains the BB84 key distribution pipeline and the CHSH
//! Bell test used to check the entangled pair source.

pub mod bell;
pub mod qkd;
pub use qkd::bb84;
