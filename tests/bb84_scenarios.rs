//! End-to-end BB84 behaviour
//!
//! Tests cover:
//! - Clean channel (no noise, no eavesdropper)
//! - Intercept-resend on every qubit
//! - Sifting statistics and the security decision
//! - Empty-input identities of the post-processing stages

use qkd_sim::protocols::qkd::bb84::Bb84Protocol;
use qkd_sim::protocols::qkd::error_correction::ErrorCorrector;
use qkd_sim::protocols::qkd::privacy_amplification::PrivacyAmplifier;
use qkd_sim::{Basis, ChannelConfig, QkdSimulator, QuantumChannel, Qubit, SimulatorConfig};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn simulator(noise_level: f64, eavesdrop_probability: f64, seed: u64) -> QkdSimulator {
    let config = SimulatorConfig {
        qubit_count: 32,
        entangled_pairs: 4,
        ..SimulatorConfig::default()
    }
    .with_seed(seed)
    .with_channel(ChannelConfig {
        noise_level,
        eavesdrop_probability,
        ..ChannelConfig::default()
    });
    QkdSimulator::new(config).unwrap()
}

#[cfg(test)]
mod scenarios {
    use super::*;

    #[test]
    fn clean_channel_agrees_on_key() {
        let mut sim = simulator(0.0, 0.0, 100);
        let result = sim.run_bb84(128);

        assert_eq!(result.error_rate, 0.0);
        assert!(result.success);
        assert!(!result.eavesdropping_detected);
        assert_eq!(result.raw_key_length, 512);
        assert!(result.final_key_length <= 128);
        assert_eq!(result.final_key_length, 128);
        assert!(result.final_key.chars().all(|c| c == '0' || c == '1'));
        assert!(result.security_parameter > 0.99);
    }

    #[test]
    fn intercept_resend_raises_error_rate() {
        let mut sim = simulator(0.02, 1.0, 200);
        let runs = 20;
        let mut detected = 0;
        let mut total_error = 0.0;

        for _ in 0..runs {
            let result = sim.run_bb84(128);
            total_error += result.error_rate;
            if result.eavesdropping_detected {
                detected += 1;
                assert!(!result.success);
                assert_eq!(result.final_key_length, 0);
            }
        }

        let mean_error = total_error / runs as f64;
        assert!(mean_error > 0.18, "mean error rate {mean_error}");
        assert!(detected >= 17, "detected in {detected}/{runs} runs");
        assert_eq!(sim.stats().runs, runs);
    }

    #[test]
    fn success_matches_threshold() {
        let mut sim = simulator(0.02, 0.05, 300);
        for length in [1, 8, 32, 64, 128] {
            let result = sim.run_bb84(length);
            assert_eq!(result.success, result.error_rate <= 0.11);
            assert_eq!(result.eavesdropping_detected, !result.success);
            assert!(result.final_key_length <= 128);
            assert!((0.0..=1.0).contains(&result.error_rate));
        }
    }

    #[test]
    fn result_serialises_to_json() {
        let mut sim = simulator(0.0, 0.0, 400);
        let result = sim.run_bb84(16);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["raw_key_length"], 64);
        assert!(json["final_key"].is_string());
        assert!(json["transmission_time_seconds"].is_number());
    }
}

#[cfg(test)]
mod sifting {
    use super::*;

    #[test]
    fn sifted_key_is_about_half() {
        let mut rng = StdRng::seed_from_u64(500);
        let mut bb84 = Bb84Protocol::new(QuantumChannel::default(), PrivacyAmplifier::default());

        let mut raw = 0;
        let mut sifted = 0;
        for _ in 0..20 {
            let session = bb84.run_session(64, &mut rng);
            assert!(session.sifted_key_alice.len() <= session.alice_bits.len());
            assert_eq!(session.sifted_key_alice.len(), session.sifted_key_bob.len());
            raw += session.alice_bits.len();
            sifted += session.sifted_key_alice.len();
        }

        let fraction = sifted as f64 / raw as f64;
        assert!((0.3..=0.7).contains(&fraction), "fraction {fraction}");
    }

    #[test]
    fn matching_basis_fidelity_on_noiseless_channel() {
        let mut rng = StdRng::seed_from_u64(600);
        let channel = QuantumChannel::noiseless();

        let mut bits = Vec::with_capacity(1000);
        let mut bases = Vec::with_capacity(1000);
        let mut qubits = Vec::with_capacity(1000);
        for i in 0..1000 {
            let bit = i % 2 == 0;
            let basis = Basis::random(&mut rng);
            qubits.push(Qubit::prepare(bit, basis, &mut rng));
            bits.push(bit);
            bases.push(basis);
        }

        let transmission = channel.transmit(qubits, &mut rng);
        let matches = transmission
            .qubits
            .into_iter()
            .zip(bits.iter().zip(&bases))
            .filter(|(qubit, (bit, basis))| {
                let mut qubit = qubit.clone();
                qubit.measure(**basis, &mut rng) == **bit
            })
            .count();

        assert_eq!(matches, 1000);
    }
}

#[cfg(test)]
mod empty_inputs {
    use super::*;

    #[test]
    fn amplify_and_correct_are_identity_on_empty() {
        let mut rng = StdRng::seed_from_u64(700);
        assert!(PrivacyAmplifier::default().amplify(&[]).is_empty());
        assert!(ErrorCorrector::default().correct(&[], 0.0, &mut rng).is_empty());
    }

    #[test]
    fn zero_length_run_is_not_an_error() {
        let mut sim = simulator(0.02, 0.005, 800);
        let result = sim.run_bb84(0);
        assert!(result.success);
        assert_eq!(result.final_key_length, 0);
        assert_eq!(result.protocol_efficiency, 0.0);
    }
}
