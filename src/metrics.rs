//! System metrics and the textual report built on top of them.

use crate::core::channels::QuantumChannel;
use crate::core::entanglement::EntangledPair;
use crate::core::qubit::Qubit;
use crate::core::utils::ratio_or;
use crate::protocols::bell::BellResult;
use crate::protocols::qkd::bb84::Bb84Result;
use crate::protocols::qkd::error_correction::ErrorCorrector;
use serde::Serialize;

/// Circuit depth assumed by the quantum volume heuristic.
pub const CIRCUIT_DEPTH: f64 = 10.0;
/// Cap of the supremacy heuristic.
pub const MAX_SUPREMACY_SCORE: f64 = 100.0;

pub const SYSTEM_STATUS: &str = "OPERATIONAL";

const LOW_COHERENCE_RATIO: f64 = 0.5;
const LOW_FIDELITY: f64 = 0.95;
const HIGH_NOISE: f64 = 0.05;
const LOW_CORRECTION_EFFICIENCY: f64 = 0.9;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Metrics {
    pub total_qubits: usize,
    pub entangled_pairs: usize,
    pub entangled_qubits: usize,
    pub coherent_qubits: usize,
    pub measured_pairs: usize,
    pub coherence_ratio: f64,
    pub entanglement_ratio: f64,
    pub quantum_volume: f64,
    pub error_correction_efficiency: f64,
    pub quantum_supremacy_score: f64,
    pub channel_fidelity: f64,
    pub noise_level: f64,
    pub protocol_runs: usize,
    pub successful_runs: usize,
}

/// Running totals of BB84 executions.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProtocolStats {
    pub runs: usize,
    pub successful_runs: usize,
    pub last_result: Option<Bb84Result>,
}

impl ProtocolStats {
    pub fn record(&mut self, result: &Bb84Result) {
        self.runs += 1;
        if result.success {
            self.successful_runs += 1;
        }
        self.last_result = Some(result.clone());
    }
}

impl Metrics {
    /// Aggregates the current in-memory state. `now` is the monotonic clock
    /// reading used for the coherence window.
    pub fn collect(
        qubits: &[Qubit],
        pairs: &[EntangledPair],
        channel: &QuantumChannel,
        corrector: &ErrorCorrector,
        stats: &ProtocolStats,
        now: f64,
    ) -> Self {
        let total_qubits = qubits.len();
        let entangled_pairs = pairs.len();
        let entangled_qubits = 2 * entangled_pairs;
        let coherent_qubits = qubits.iter().filter(|q| q.is_coherent(now)).count();
        let measured_pairs = pairs.iter().filter(|p| p.measured).count();

        let n = total_qubits as f64;
        let fidelity = channel.fidelity();
        // width = sqrt(n), so width^2 = n
        let quantum_volume = n.min(CIRCUIT_DEPTH * CIRCUIT_DEPTH) * fidelity;
        let quantum_supremacy_score =
            (n * entangled_pairs as f64 * fidelity / 1000.0).min(MAX_SUPREMACY_SCORE);

        Self {
            total_qubits,
            entangled_pairs,
            entangled_qubits,
            coherent_qubits,
            measured_pairs,
            coherence_ratio: ratio_or(coherent_qubits as f64, n, 0.0),
            entanglement_ratio: ratio_or(entangled_qubits as f64, n, 0.0),
            quantum_volume,
            error_correction_efficiency: corrector.efficiency(),
            quantum_supremacy_score,
            channel_fidelity: fidelity,
            noise_level: channel.noise_level(),
            protocol_runs: stats.runs,
            successful_runs: stats.successful_runs,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SecurityAssessment {
    /// Last BB84 run stayed under the threshold (true before any run)
    pub channel_secure: bool,
    pub eavesdropping_detected: bool,
    pub entanglement_verified: bool,
    pub error_correction_healthy: bool,
    pub last_error_rate: Option<f64>,
}

impl SecurityAssessment {
    pub fn assess(metrics: &Metrics, bell: &BellResult, stats: &ProtocolStats) -> Self {
        let last = stats.last_result.as_ref();
        Self {
            channel_secure: last.is_none_or(|r| r.success),
            eavesdropping_detected: last.is_some_and(|r| r.eavesdropping_detected),
            entanglement_verified: bell.entanglement_verified,
            error_correction_healthy: metrics.error_correction_efficiency
                >= LOW_CORRECTION_EFFICIENCY,
            last_error_rate: last.map(|r| r.error_rate),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    /// RFC 3339
    pub timestamp: String,
    pub system_status: String,
    pub metrics: Metrics,
    pub bell_test: BellResult,
    pub security_assessment: SecurityAssessment,
    pub recommendations: Vec<String>,
}

impl Report {
    pub fn new(metrics: Metrics, bell_test: BellResult, stats: &ProtocolStats) -> Self {
        let security_assessment = SecurityAssessment::assess(&metrics, &bell_test, stats);
        let recommendations = recommendations(&metrics, &bell_test, &security_assessment);

        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            system_status: SYSTEM_STATUS.to_string(),
            metrics,
            bell_test,
            security_assessment,
            recommendations,
        }
    }
}

/// Rule table turning metrics into advice.
pub fn recommendations(
    metrics: &Metrics,
    bell: &BellResult,
    assessment: &SecurityAssessment,
) -> Vec<String> {
    let mut out = Vec::new();

    if metrics.coherence_ratio < LOW_COHERENCE_RATIO {
        out.push("Improve environmental isolation to extend qubit coherence times".to_string());
    }
    if metrics.channel_fidelity < LOW_FIDELITY {
        out.push("Recalibrate the quantum channel to raise transmission fidelity".to_string());
    }
    if metrics.noise_level > HIGH_NOISE {
        out.push("Reduce channel noise with better shielding or shorter links".to_string());
    }
    if !assessment.error_correction_healthy {
        out.push("Error correction is dropping keys; lower the channel error rate".to_string());
    }
    if assessment.eavesdropping_detected {
        out.push("Eavesdropping detected on the last BB84 run; discard the key and audit the channel".to_string());
    }
    if let Some(err) = &bell.error {
        out.push(format!("Bell test unavailable ({err}); replenish the entangled pair source"));
    } else if !bell.bell_violation {
        out.push("No CHSH violation observed; verify the entangled pair source".to_string());
    }

    if out.is_empty() {
        out.push("All subsystems nominal".to_string());
    }
    out
}
