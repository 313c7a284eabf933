use crate::config::SimulatorConfig;
use crate::core::channels::QuantumChannel;
use crate::core::entanglement::{EntangledPair, create_entangled_pairs};
use crate::core::errors::SimulatorError;
use crate::core::qubit::Qubit;
use crate::core::utils::monotonic_seconds;
use crate::metrics::{Metrics, ProtocolStats, Report};
use crate::protocols::bell::{BellResult, execute_bell_test};
use crate::protocols::qkd::bb84::{Bb84Protocol, Bb84Result};
use crate::protocols::qkd::privacy_amplification::{PrivacyAmplifier, UniversalHashFamily};
use crate::sampler::Sampler;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

/// Members drawn for the privacy amplification hash family.
const HASH_FAMILY_SIZE: usize = 16;

/// The engine the host talks to.
///
/// Owns its random source, qubit pool and entangled pairs. Operations take
/// `&mut self`, so sharing one simulator between threads requires an
/// external lock; that lock is what keeps each qubit measured at most once.
#[derive(Debug)]
pub struct QkdSimulator {
    config: SimulatorConfig,
    rng: StdRng,
    qubits: Vec<Qubit>,
    pairs: Vec<EntangledPair>,
    bb84: Bb84Protocol,
    sampler: Sampler,
    stats: ProtocolStats,
}

impl QkdSimulator {
    /// Validates `config` and builds the qubit pool and entangled pairs.
    pub fn new(config: SimulatorConfig) -> Result<Self, SimulatorError> {
        config.validate()?;
        let channel = QuantumChannel::new(&config.channel)?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let qubits: Vec<Qubit> = (0..config.qubit_count)
            .map(|_| Qubit::random(&mut rng))
            .collect();
        let pairs = create_entangled_pairs(config.entangled_pairs, &mut rng);

        let family = UniversalHashFamily::generate(HASH_FAMILY_SIZE, &mut rng);
        let amplifier = PrivacyAmplifier::from_family(&family, config.final_key_length);
        let bb84 = Bb84Protocol::from_config(&config, channel, amplifier);

        info!(
            qubits = qubits.len(),
            pairs = pairs.len(),
            seeded = config.seed.is_some(),
            "QKD simulator initialised"
        );

        Ok(Self {
            sampler: Sampler::new(config.bell_shots),
            config,
            rng,
            qubits,
            pairs,
            bb84,
            stats: ProtocolStats::default(),
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn channel(&self) -> &QuantumChannel {
        self.bb84.channel()
    }

    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    pub fn pairs(&self) -> &[EntangledPair] {
        &self.pairs
    }

    pub fn stats(&self) -> &ProtocolStats {
        &self.stats
    }

    /// Runs BB84 for a `message_length`-bit key on fresh qubits.
    pub fn run_bb84(&mut self, message_length: usize) -> Bb84Result {
        let result = self.bb84.execute(message_length, &mut self.rng);
        self.stats.record(&result);
        result
    }

    /// Runs the CHSH test on one of the pre-generated pairs.
    pub fn run_bell_test(&mut self, pair_index: usize) -> BellResult {
        execute_bell_test(&mut self.pairs, pair_index, &self.sampler, &mut self.rng)
    }

    pub fn get_metrics(&self) -> Metrics {
        Metrics::collect(
            &self.qubits,
            &self.pairs,
            self.bb84.channel(),
            self.bb84.corrector(),
            &self.stats,
            monotonic_seconds(),
        )
    }

    /// Bell test on the first unconsumed pair, then metrics reflecting it.
    pub fn generate_report(&mut self) -> Report {
        let pair_index = self
            .pairs
            .iter()
            .position(|p| !p.measured)
            .unwrap_or(self.pairs.len());
        debug!(pair_index, "running Bell test for report");

        let bell = self.run_bell_test(pair_index);
        let metrics = self.get_metrics();
        let report = Report::new(metrics, bell, &self.stats);
        info!(
            recommendations = report.recommendations.len(),
            "system report generated"
        );
        report
    }
}
