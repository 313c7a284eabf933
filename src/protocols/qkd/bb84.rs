//! BB84 Quantum Key Distribution Protocol.
//!
//! Alice encodes random bits in random bases, the qubits cross a (possibly
//! tapped) [`QuantumChannel`], Bob measures in his own random bases, and the
//! two keep the positions where the bases agree. A random sample of that
//! sifted key estimates the error rate; above the security threshold the
//! run is declared compromised.

use crate::config::{DEFAULT_ERROR_SAMPLE_SIZE, DEFAULT_SECURITY_THRESHOLD, SimulatorConfig};
use crate::core::channels::QuantumChannel;
use crate::core::qubit::{Basis, Qubit};
use crate::core::utils::{bits_to_string, ratio_or, security_parameter};
use crate::protocols::qkd::error_correction::ErrorCorrector;
use crate::protocols::qkd::privacy_amplification::PrivacyAmplifier;
use rand::Rng;
use rand::seq::index;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Raw qubits sent per requested key bit.
pub const QUBITS_PER_KEY_BIT: usize = 4;

/// Everything produced during one protocol run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Bb84Session {
    pub alice_bits: Vec<bool>,
    pub alice_bases: Vec<Basis>,
    pub bob_bases: Vec<Basis>,
    pub bob_measurements: Vec<bool>,
    pub sifted_key_alice: Vec<bool>,
    pub sifted_key_bob: Vec<bool>,
    pub corrected_key: Vec<bool>,
    pub final_key: Vec<bool>,
    pub error_rate: f64,
    pub eavesdropping_detected: bool,
    /// Number of qubits the eavesdropper intercepted
    pub intercepted: usize,
}

/// Summary of a BB84 run, ready to be serialised for the host.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bb84Result {
    pub success: bool,
    pub raw_key_length: usize,
    pub sifted_key_length: usize,
    pub final_key_length: usize,
    pub error_rate: f64,
    pub eavesdropping_detected: bool,
    /// Final key as a '0'/'1' string
    pub final_key: String,
    pub security_parameter: f64,
    pub protocol_efficiency: f64,
    pub transmission_time_seconds: f64,
}

impl Bb84Session {
    /// Summarises the session. `elapsed` is the wall time of the run.
    pub fn to_result(&self, elapsed: Duration) -> Bb84Result {
        Bb84Result {
            success: !self.eavesdropping_detected,
            raw_key_length: self.alice_bits.len(),
            sifted_key_length: self.sifted_key_alice.len(),
            final_key_length: self.final_key.len(),
            error_rate: self.error_rate,
            eavesdropping_detected: self.eavesdropping_detected,
            final_key: bits_to_string(&self.final_key),
            security_parameter: security_parameter(self.error_rate),
            protocol_efficiency: ratio_or(
                self.final_key.len() as f64,
                self.alice_bits.len() as f64,
                0.0,
            ),
            transmission_time_seconds: elapsed.as_secs_f64(),
        }
    }
}

/// Sender, channel and receiver wired together with the post-processing stages.
#[derive(Clone, Debug)]
pub struct Bb84Protocol {
    channel: QuantumChannel,
    corrector: ErrorCorrector,
    amplifier: PrivacyAmplifier,
    security_threshold: f64,
    error_sample_size: usize,
}

impl Bb84Protocol {
    pub fn new(channel: QuantumChannel, amplifier: PrivacyAmplifier) -> Self {
        Self {
            channel,
            corrector: ErrorCorrector::new(DEFAULT_SECURITY_THRESHOLD),
            amplifier,
            security_threshold: DEFAULT_SECURITY_THRESHOLD,
            error_sample_size: DEFAULT_ERROR_SAMPLE_SIZE,
        }
    }

    /// Takes threshold and sample size from `config`; the channel must already be built.
    pub fn from_config(config: &SimulatorConfig, channel: QuantumChannel, amplifier: PrivacyAmplifier) -> Self {
        Self {
            channel,
            corrector: ErrorCorrector::new(config.security_threshold),
            amplifier,
            security_threshold: config.security_threshold,
            error_sample_size: config.error_sample_size,
        }
    }

    pub fn channel(&self) -> &QuantumChannel {
        &self.channel
    }

    pub fn corrector(&self) -> &ErrorCorrector {
        &self.corrector
    }

    pub fn security_threshold(&self) -> f64 {
        self.security_threshold
    }

    /// Runs the protocol for a `message_length`-bit key and summarises it.
    ///
    /// Never fails: an insecure channel is reported through
    /// `success == false` and `eavesdropping_detected == true`.
    pub fn execute<R: Rng + ?Sized>(&mut self, message_length: usize, rng: &mut R) -> Bb84Result {
        let start = Instant::now();
        let session = self.run_session(message_length, rng);
        let result = session.to_result(start.elapsed());

        info!(
            raw = result.raw_key_length,
            sifted = result.sifted_key_length,
            final_len = result.final_key_length,
            error_rate = result.error_rate,
            success = result.success,
            "BB84 run completed"
        );
        result
    }

    /// Runs the protocol and keeps every intermediate sequence.
    pub fn run_session<R: Rng + ?Sized>(&mut self, message_length: usize, rng: &mut R) -> Bb84Session {
        let num_qubits = QUBITS_PER_KEY_BIT * message_length;

        // Alice prepares qubits
        let mut alice_bits = Vec::with_capacity(num_qubits);
        let mut alice_bases = Vec::with_capacity(num_qubits);
        let mut qubits = Vec::with_capacity(num_qubits);

        for _ in 0..num_qubits {
            let bit = rng.random_bool(0.5);
            let basis = Basis::random(rng);
            qubits.push(Qubit::prepare(bit, basis, rng));
            alice_bits.push(bit);
            alice_bases.push(basis);
        }

        // Alice sends qubits to Bob
        let transmission = self.channel.transmit(qubits, rng);
        debug!(
            qubits = num_qubits,
            noised = transmission.stats.noised,
            decohered = transmission.stats.decohered,
            intercepted = transmission.stats.intercepted,
            "qubits transmitted"
        );

        // Bob measures
        let mut bob_bases = Vec::with_capacity(num_qubits);
        let mut bob_measurements = Vec::with_capacity(num_qubits);

        for mut qubit in transmission.qubits {
            let basis = Basis::random(rng);
            bob_measurements.push(qubit.measure(basis, rng));
            bob_bases.push(basis);
        }

        // Sifting stage
        let (sifted_key_alice, sifted_key_bob) =
            sift(&alice_bits, &alice_bases, &bob_bases, &bob_measurements);
        debug!(sifted = sifted_key_alice.len(), "bases reconciled");

        let error_rate = estimate_error_rate(
            &sifted_key_alice,
            &sifted_key_bob,
            self.error_sample_size,
            rng,
        );
        let eavesdropping_detected = error_rate > self.security_threshold;
        if eavesdropping_detected {
            warn!(
                error_rate,
                threshold = self.security_threshold,
                "error rate above threshold, key must not be used"
            );
        }

        let corrected_key = self.corrector.correct(&sifted_key_bob, error_rate, rng);
        let final_key = self.amplifier.amplify(&corrected_key);

        Bb84Session {
            alice_bits,
            alice_bases,
            bob_bases,
            bob_measurements,
            sifted_key_alice,
            sifted_key_bob,
            corrected_key,
            final_key,
            error_rate,
            eavesdropping_detected,
            intercepted: transmission.stats.intercepted,
        }
    }
}

/// Keeps the positions where Alice's and Bob's bases agree.
pub fn sift(
    alice_bits: &[bool],
    alice_bases: &[Basis],
    bob_bases: &[Basis],
    bob_measurements: &[bool],
) -> (Vec<bool>, Vec<bool>) {
    alice_bits
        .iter()
        .zip(alice_bases)
        .zip(bob_bases.iter().zip(bob_measurements))
        .filter(|((_, a_basis), (b_basis, _))| a_basis == b_basis)
        .map(|((&a_bit, _), (_, &b_bit))| (a_bit, b_bit))
        .unzip()
}

/// Fraction of mismatches over a random sample of at most `max_sample` positions.
///
/// An empty sifted key gives 0; keys of different lengths give 1.
pub fn estimate_error_rate<R: Rng + ?Sized>(
    alice: &[bool],
    bob: &[bool],
    max_sample: usize,
    rng: &mut R,
) -> f64 {
    if alice.len() != bob.len() {
        return 1.0;
    }
    if alice.is_empty() {
        return 0.0;
    }

    let sample_size = max_sample.min(alice.len());
    let mismatches = index::sample(rng, alice.len(), sample_size)
        .iter()
        .filter(|&i| alice[i] != bob[i])
        .count();

    ratio_or(mismatches as f64, sample_size as f64, 0.0)
}
