//! Director engine
//!
//! Main coupling loop integrating all components:
//! - Call-condition gating (should a sub-model run this round?)
//! - Discrete sub-model advance + clamped transfer handoff
//! - Continuous sub-model advance + conservation reconciliation
//! - Per-round snapshot logging (results lines + diagnostic events)
//!
//! # Architecture
//!
//! The Director owns the shared compartment vector and runs the round
//! loop:
//!
//! ```text
//! For each round r:
//! 1. For each discrete sub-model: gate -> configure -> advance,
//!    then clamp and apply its transfer into the compartments
//! 2. For each continuous sub-model: gate -> configure (with the
//!    already-updated compartments) -> advance, then reconcile its
//!    raw result back to the conservation target
//! 3. Append a snapshot (round index + compartment vector)
//! 4. Evaluate the stop condition (exhaustion or round budget)
//! ```
//!
//! Rounds are strictly sequential and atomic: all work happens on a
//! working copy of the compartment vector which is committed only when
//! every gated sub-model has advanced and reconciled successfully. A
//! failed round leaves the last-good state authoritative for forensic
//! replay.
//!
//! # Example
//!
//! ```rust
//! use multilevel_simulator_core_rs::director::{Director, DirectorConfig, SubModelConfig};
//! use multilevel_simulator_core_rs::submodel::FlowRate;
//!
//! let config = DirectorConfig {
//!     population_size: 1000,
//!     compartment_labels: vec![
//!         "S".to_string(), "E".to_string(), "I".to_string(), "R".to_string(),
//!     ],
//!     initial_counts: vec![990, 10, 0, 0],
//!     max_rounds: 20,
//!     stop_when_exhausted: Some(vec![1, 2]),
//!     rng_seed: 12345,
//!     submodel_configs: vec![
//!         SubModelConfig::Contact {
//!             name: "mobility".to_string(),
//!             susceptible: 0,
//!             exposed: 1,
//!             infectious: vec![1, 2],
//!             transmission_rate: 0.8,
//!         },
//!         SubModelConfig::LinearFlow {
//!             name: "eir".to_string(),
//!             coverage: vec![1, 2, 3],
//!             flows: vec![
//!                 FlowRate { source: 1, destination: 2, rate: 1.0 },
//!                 FlowRate { source: 2, destination: 3, rate: 0.1 },
//!             ],
//!             duration: 0.15,
//!             steps: 1000,
//!             gate: None,
//!             policy: None,
//!         },
//!     ],
//! };
//!
//! let mut director = Director::new(config).unwrap();
//! let rounds = director.run().unwrap();
//! assert!(rounds <= 20);
//! assert_eq!(director.compartments().total(), 1000);
//! ```

use crate::events::{Event, EventLog, StopReason};
use crate::gate::GateCondition;
use crate::models::CompartmentVector;
use crate::reconcile::{self, ReconcileError, ReconcilePolicy};
use crate::report::RoundLog;
use crate::rng::RngManager;
use crate::submodel::{
    ContactModel, FlowRate, LinearFlowModel, RawOutput, RoundContext, SubModel, SubModelError,
    SubModelKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Configuration Types
// ============================================================================

/// Complete director configuration
///
/// Contains all parameters needed to initialize a coupled simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorConfig {
    /// Conserved total population size (> 0)
    pub population_size: u64,

    /// Bucket names, in defined order (e.g., S, E, I, R)
    pub compartment_labels: Vec<String>,

    /// Initial bucket distribution; must sum to `population_size`
    pub initial_counts: Vec<u64>,

    /// Total round budget (> 0)
    pub max_rounds: u64,

    /// Buckets whose joint exhaustion stops the run early (e.g., stop
    /// when both E and I reach zero). None disables early stopping.
    pub stop_when_exhausted: Option<Vec<usize>>,

    /// Seed for the Director-owned deterministic RNG
    pub rng_seed: u64,

    /// Built-in sub-models constructed at setup. Custom trait objects
    /// can additionally be attached via [`Director::register`].
    pub submodel_configs: Vec<SubModelConfig>,
}

/// Built-in sub-model selection
///
/// Each variant names the gate and reconciliation behavior it carries;
/// dispatch is resolved once when the Director is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SubModelConfig {
    /// Continuous: forward-Euler linear flows over a covered subset of
    /// buckets (largest-remainder reconciliation unless overridden)
    LinearFlow {
        name: String,
        /// Bucket indices this model evolves
        coverage: Vec<usize>,
        /// Per-unit transition rates between covered buckets
        flows: Vec<FlowRate>,
        /// Integration window per round
        duration: f64,
        /// Euler steps per window
        steps: u32,
        /// Gate override; defaults to `Always`
        gate: Option<GateCondition>,
        /// Reconciliation override; defaults to largest-remainder
        policy: Option<ReconcilePolicy>,
    },

    /// Discrete: well-mixed stochastic contact process producing a
    /// susceptible -> exposed transfer (population-gated)
    Contact {
        name: String,
        susceptible: usize,
        exposed: usize,
        infectious: Vec<usize>,
        transmission_rate: f64,
    },
}

impl SubModelConfig {
    /// Sub-model name, for validation messages
    fn name(&self) -> &str {
        match self {
            SubModelConfig::LinearFlow { name, .. } => name,
            SubModelConfig::Contact { name, .. } => name,
        }
    }
}

// ============================================================================
// Errors and results
// ============================================================================

/// Simulation error types
///
/// All errors are fatal for the operation that raised them and surface
/// to the Director's caller. The core performs no logging-based
/// recovery and no partial-state commits.
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    /// Configuration validation error (setup refuses to start)
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Round requested while the director is not accepting rounds
    #[error("director is not running (status: {status:?})")]
    NotRunning { status: DirectorStatus },

    /// A sub-model's advance could not produce a result
    #[error(transparent)]
    SubModel(#[from] SubModelError),

    /// Reconciliation refused the sub-model's output
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// Defensive check: a committed round broke the conservation
    /// invariant. Indicates a bug in the coupling core itself.
    #[error("conservation violated at round {round}: expected total {expected}, found {actual}")]
    ConservationViolated {
        round: u64,
        expected: u64,
        actual: u64,
    },

    /// Checkpoint serialization or validation failure
    #[error("checkpoint error: {0}")]
    Checkpoint(String),
}

/// Director lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectorStatus {
    /// Configured; sub-models may still be registered
    Idle,
    /// Round loop in progress
    Running,
    /// Stop condition held; no further rounds accepted
    Stopped,
}

/// Result of a single round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundResult {
    /// Round index that was executed (0-based)
    pub round: u64,

    /// Discrete sub-models whose gate passed and that advanced
    pub discrete_ran: usize,

    /// Continuous sub-models whose gate passed and that advanced
    pub continuous_ran: usize,

    /// Compartment counts after the round committed
    pub counts: Vec<u64>,

    /// True if the stop condition held after this round
    pub stopped: bool,

    /// Why the run stopped, when `stopped` is true
    pub stop_reason: Option<StopReason>,
}

/// Registry entry: a sub-model plus its dispatch, resolved at registration
struct RegisteredSubModel {
    model: Box<dyn SubModel>,
    kind: SubModelKind,
    gate: GateCondition,
    policy: ReconcilePolicy,
    coverage: Vec<usize>,
}

// ============================================================================
// Director
// ============================================================================

/// Owns the shared compartment state and runs the round loop
///
/// # Determinism
///
/// All randomness flows through the Director-owned seeded RNG. Same
/// seed + same config = identical results (deterministic replay).
pub struct Director {
    config: DirectorConfig,
    compartments: CompartmentVector,
    round: u64,
    status: DirectorStatus,
    rng: RngManager,
    registry: Vec<RegisteredSubModel>,
    round_log: RoundLog,
    event_log: EventLog,
}

impl std::fmt::Debug for Director {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Director")
            .field("config", &self.config)
            .field("compartments", &self.compartments)
            .field("round", &self.round)
            .field("status", &self.status)
            .field("rng", &self.rng)
            .field("round_log", &self.round_log)
            .field("event_log", &self.event_log)
            .finish_non_exhaustive()
    }
}

impl Director {
    /// Create a new director from configuration
    ///
    /// Validates the configuration exhaustively and constructs the
    /// built-in sub-models. The director starts `Idle`; the first call
    /// to [`Director::round`] moves it to `Running`.
    pub fn new(config: DirectorConfig) -> Result<Self, SimulationError> {
        Self::validate_config(&config)?;

        let compartments = CompartmentVector::new(
            config.compartment_labels.clone(),
            config.initial_counts.clone(),
        )
        .map_err(|e| SimulationError::InvalidConfig(e.to_string()))?;

        let rng = RngManager::new(config.rng_seed);
        let round_log = RoundLog::new(config.compartment_labels.clone());

        let mut director = Self {
            compartments,
            round: 0,
            status: DirectorStatus::Idle,
            rng,
            registry: Vec::new(),
            round_log,
            event_log: EventLog::new(),
            config,
        };

        // resolve built-in sub-models into the registry once, here
        for submodel_config in director.config.submodel_configs.clone() {
            let model: Box<dyn SubModel> = match submodel_config {
                SubModelConfig::LinearFlow {
                    name,
                    coverage,
                    flows,
                    duration,
                    steps,
                    gate,
                    policy,
                } => {
                    let mut model = LinearFlowModel::new(name, coverage, flows, duration, steps);
                    if let Some(gate) = gate {
                        model = model.with_gate(gate);
                    }
                    if let Some(policy) = policy {
                        model = model.with_policy(policy);
                    }
                    Box::new(model)
                }
                SubModelConfig::Contact {
                    name,
                    susceptible,
                    exposed,
                    infectious,
                    transmission_rate,
                } => Box::new(ContactModel::new(
                    name,
                    susceptible,
                    exposed,
                    infectious,
                    transmission_rate,
                )),
            };
            director.register(model)?;
        }

        Ok(director)
    }

    /// Validate configuration
    fn validate_config(config: &DirectorConfig) -> Result<(), SimulationError> {
        if config.population_size == 0 {
            return Err(SimulationError::InvalidConfig(
                "population_size must be > 0".to_string(),
            ));
        }
        if config.max_rounds == 0 {
            return Err(SimulationError::InvalidConfig(
                "max_rounds must be > 0".to_string(),
            ));
        }
        if config.compartment_labels.len() != config.initial_counts.len() {
            return Err(SimulationError::InvalidConfig(format!(
                "{} labels but {} initial counts",
                config.compartment_labels.len(),
                config.initial_counts.len()
            )));
        }

        let initial_sum: u64 = config.initial_counts.iter().sum();
        if initial_sum != config.population_size {
            return Err(SimulationError::InvalidConfig(format!(
                "initial counts sum to {} but population_size is {}",
                initial_sum, config.population_size
            )));
        }

        let buckets = config.compartment_labels.len();
        if let Some(exhaustion) = &config.stop_when_exhausted {
            if exhaustion.is_empty() {
                return Err(SimulationError::InvalidConfig(
                    "stop_when_exhausted must name at least one bucket".to_string(),
                ));
            }
            for &index in exhaustion {
                if index >= buckets {
                    return Err(SimulationError::InvalidConfig(format!(
                        "stop_when_exhausted references bucket {index}, only {buckets} exist"
                    )));
                }
            }
        }

        // duplicate sub-model names make event logs ambiguous
        let mut names = std::collections::HashSet::new();
        for submodel_config in &config.submodel_configs {
            if !names.insert(submodel_config.name().to_string()) {
                return Err(SimulationError::InvalidConfig(format!(
                    "duplicate sub-model name: {}",
                    submodel_config.name()
                )));
            }
            Self::validate_submodel_config(submodel_config, buckets)?;
        }

        Ok(())
    }

    fn validate_submodel_config(
        config: &SubModelConfig,
        buckets: usize,
    ) -> Result<(), SimulationError> {
        let bad_bucket = |name: &str, index: usize| {
            SimulationError::InvalidConfig(format!(
                "sub-model '{name}' references bucket {index}, only {buckets} exist"
            ))
        };
        match config {
            SubModelConfig::LinearFlow {
                name,
                coverage,
                flows,
                duration,
                steps,
                gate,
                ..
            } => {
                if coverage.is_empty() {
                    return Err(SimulationError::InvalidConfig(format!(
                        "sub-model '{name}' covers no buckets"
                    )));
                }
                let mut seen = std::collections::HashSet::new();
                for &bucket in coverage {
                    if bucket >= buckets {
                        return Err(bad_bucket(name, bucket));
                    }
                    if !seen.insert(bucket) {
                        return Err(SimulationError::InvalidConfig(format!(
                            "sub-model '{name}' covers bucket {bucket} twice"
                        )));
                    }
                }
                for flow in flows {
                    if !coverage.contains(&flow.source) || !coverage.contains(&flow.destination) {
                        return Err(SimulationError::InvalidConfig(format!(
                            "sub-model '{name}' flow {} -> {} leaves its coverage",
                            flow.source, flow.destination
                        )));
                    }
                    if flow.rate < 0.0 {
                        return Err(SimulationError::InvalidConfig(format!(
                            "sub-model '{name}' has negative flow rate {}",
                            flow.rate
                        )));
                    }
                }
                if *duration <= 0.0 {
                    return Err(SimulationError::InvalidConfig(format!(
                        "sub-model '{name}' integration duration must be positive"
                    )));
                }
                if *steps == 0 {
                    return Err(SimulationError::InvalidConfig(format!(
                        "sub-model '{name}' needs at least one Euler step"
                    )));
                }
                if let Some(gate) = gate {
                    Self::validate_gate(name, gate, buckets)?;
                }
                Ok(())
            }
            SubModelConfig::Contact {
                name,
                susceptible,
                exposed,
                infectious,
                transmission_rate,
            } => {
                if *susceptible >= buckets {
                    return Err(bad_bucket(name, *susceptible));
                }
                if *exposed >= buckets {
                    return Err(bad_bucket(name, *exposed));
                }
                if susceptible == exposed {
                    return Err(SimulationError::InvalidConfig(format!(
                        "sub-model '{name}' transfers bucket {susceptible} onto itself"
                    )));
                }
                for &index in infectious {
                    if index >= buckets {
                        return Err(bad_bucket(name, index));
                    }
                }
                if *transmission_rate < 0.0 {
                    return Err(SimulationError::InvalidConfig(format!(
                        "sub-model '{name}' has negative transmission rate"
                    )));
                }
                Ok(())
            }
        }
    }

    fn validate_gate(
        name: &str,
        gate: &GateCondition,
        buckets: usize,
    ) -> Result<(), SimulationError> {
        match gate {
            GateCondition::Periodic { frequency } if *frequency == 0 => {
                Err(SimulationError::InvalidConfig(format!(
                    "sub-model '{name}' periodic gate frequency must be >= 1"
                )))
            }
            GateCondition::PopulationGated {
                susceptible,
                infectious,
            } => {
                if *susceptible >= buckets {
                    return Err(SimulationError::InvalidConfig(format!(
                        "sub-model '{name}' gate references bucket {susceptible}, only {buckets} exist"
                    )));
                }
                for &index in infectious {
                    if index >= buckets {
                        return Err(SimulationError::InvalidConfig(format!(
                            "sub-model '{name}' gate references bucket {index}, only {buckets} exist"
                        )));
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Attach a sub-model to the registry
    ///
    /// Resolves the model's declared gate and reconciliation policy
    /// into the registry entry. Only permitted while the director is
    /// `Idle` (before the first round), so dispatch never changes
    /// mid-run.
    pub fn register(&mut self, model: Box<dyn SubModel>) -> Result<(), SimulationError> {
        if self.status != DirectorStatus::Idle {
            return Err(SimulationError::NotRunning {
                status: self.status,
            });
        }

        let buckets = self.compartments.len();
        let gate = model.call_condition();
        Self::validate_gate(model.name(), &gate, buckets)?;

        let coverage = model.coverage().to_vec();
        if model.kind() == SubModelKind::Continuous {
            if coverage.is_empty() {
                return Err(SimulationError::InvalidConfig(format!(
                    "continuous sub-model '{}' covers no buckets",
                    model.name()
                )));
            }
            for &bucket in &coverage {
                if bucket >= buckets {
                    return Err(SimulationError::InvalidConfig(format!(
                        "sub-model '{}' covers bucket {bucket}, only {buckets} exist",
                        model.name()
                    )));
                }
            }
        }

        self.registry.push(RegisteredSubModel {
            kind: model.kind(),
            gate,
            policy: model.reconcile_policy(),
            coverage,
            model,
        });
        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current round index (number of completed rounds)
    pub fn current_round(&self) -> u64 {
        self.round
    }

    /// Lifecycle state
    pub fn status(&self) -> DirectorStatus {
        self.status
    }

    /// Authoritative compartment state (last committed round)
    pub fn compartments(&self) -> &CompartmentVector {
        &self.compartments
    }

    /// The configuration this director was built from
    pub fn config(&self) -> &DirectorConfig {
        &self.config
    }

    /// Conserved total population size
    pub fn population_size(&self) -> u64 {
        self.config.population_size
    }

    /// Diagnostic event log
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Per-round snapshot log
    pub fn round_log(&self) -> &RoundLog {
        &self.round_log
    }

    /// Rendered results lines, one per completed round
    pub fn results_lines(&self) -> Vec<String> {
        self.round_log.lines()
    }

    /// Current RNG state (exposed for checkpointing)
    pub(crate) fn rng_state(&self) -> u64 {
        self.rng.get_state()
    }

    pub(crate) fn restore_state(
        &mut self,
        round: u64,
        status: DirectorStatus,
        counts: Vec<u64>,
        rng_state: u64,
        round_log: RoundLog,
    ) -> Result<(), SimulationError> {
        self.compartments
            .replace_counts(counts)
            .map_err(|e| SimulationError::Checkpoint(e.to_string()))?;
        if self.compartments.total() != self.config.population_size {
            return Err(SimulationError::Checkpoint(format!(
                "snapshot counts sum to {}, population_size is {}",
                self.compartments.total(),
                self.config.population_size
            )));
        }
        self.round = round;
        self.status = status;
        self.rng = RngManager::new(rng_state);
        self.round_log = round_log;
        Ok(())
    }

    // ========================================================================
    // Round Loop Implementation
    // ========================================================================

    /// Execute one coupling round
    ///
    /// Returns the committed [`RoundResult`], or an error if any gated
    /// sub-model failed. On error nothing is committed: compartments,
    /// logs, and the round index keep their last-good values.
    pub fn round(&mut self) -> Result<RoundResult, SimulationError> {
        match self.status {
            DirectorStatus::Idle => self.status = DirectorStatus::Running,
            DirectorStatus::Running => {}
            DirectorStatus::Stopped => {
                return Err(SimulationError::NotRunning {
                    status: self.status,
                });
            }
        }

        let round = self.round;
        let population_size = self.config.population_size;

        // all mutation happens on a working copy; committed only after
        // every gated sub-model has advanced and reconciled
        let mut working = self.compartments.clone();
        let mut round_events: Vec<Event> = Vec::new();
        let mut discrete_ran = 0;
        let mut continuous_ran = 0;

        // STEP 1: DISCRETE SUB-MODELS
        // Agent/cellular dynamics move individuals between two buckets;
        // the transfer is clamped so a source bucket never goes negative.
        for entry in self
            .registry
            .iter_mut()
            .filter(|e| e.kind == SubModelKind::Discrete)
        {
            if !entry.gate.evaluate(&working, round) {
                round_events.push(Event::GateSkipped {
                    round,
                    submodel: entry.model.name().to_string(),
                });
                continue;
            }

            let ctx = RoundContext {
                round,
                population_size,
                compartments: &working,
            };
            entry.model.configure(&ctx)?;
            let output = entry.model.advance(&mut self.rng)?;

            let (source, destination, requested) = match output {
                RawOutput::Transfer {
                    source,
                    destination,
                    count,
                } => (source, destination, count),
                other => {
                    return Err(SubModelError::OutputMismatch {
                        name: entry.model.name().to_string(),
                        expected: "transfer",
                        got: other.kind_name(),
                    }
                    .into());
                }
            };

            let applied = reconcile::apply_transfer(&mut working, source, destination, requested)?;
            discrete_ran += 1;
            round_events.push(Event::TransferApplied {
                round,
                submodel: entry.model.name().to_string(),
                source,
                destination,
                requested,
                applied,
            });

            if working.total() != population_size {
                return Err(SimulationError::ConservationViolated {
                    round,
                    expected: population_size,
                    actual: working.total(),
                });
            }
        }

        // STEP 2: CONTINUOUS SUB-MODELS
        // ODE-style dynamics run on the already-updated compartments and
        // are reconciled back to the conservation target.
        for entry in self
            .registry
            .iter_mut()
            .filter(|e| e.kind == SubModelKind::Continuous)
        {
            if !entry.gate.evaluate(&working, round) {
                round_events.push(Event::GateSkipped {
                    round,
                    submodel: entry.model.name().to_string(),
                });
                continue;
            }

            let ctx = RoundContext {
                round,
                population_size,
                compartments: &working,
            };
            entry.model.configure(&ctx)?;
            let output = entry.model.advance(&mut self.rng)?;

            let raw = match output {
                RawOutput::Continuous(values) => values,
                other => {
                    return Err(SubModelError::OutputMismatch {
                        name: entry.model.name().to_string(),
                        expected: "continuous",
                        got: other.kind_name(),
                    }
                    .into());
                }
            };
            if raw.len() != entry.coverage.len() {
                return Err(ReconcileError::LengthMismatch {
                    expected: entry.coverage.len(),
                    got: raw.len(),
                }
                .into());
            }

            // conservation target: total population minus whatever sits
            // in buckets this model does not evolve (e.g., S is held by
            // the discrete side while the ODE covers E, I, R)
            let uncovered: u64 = (0..working.len())
                .filter(|i| !entry.coverage.contains(i))
                .map(|i| working.get(i).unwrap_or(0))
                .sum();
            let target = population_size - uncovered;

            let floor_sum: u64 = raw.iter().map(|v| v.max(0.0).trunc() as u64).sum();
            let integered = reconcile::apply(entry.policy, &raw, target)?;
            for (slot, &bucket) in entry.coverage.iter().enumerate() {
                working
                    .set(bucket, integered[slot])
                    .map_err(|_| ReconcileError::UnknownBucket(bucket))?;
            }

            continuous_ran += 1;
            round_events.push(Event::ContinuousReconciled {
                round,
                submodel: entry.model.name().to_string(),
                policy: entry.policy,
                target,
                deficit: target.saturating_sub(floor_sum),
            });

            if working.total() != population_size {
                return Err(SimulationError::ConservationViolated {
                    round,
                    expected: population_size,
                    actual: working.total(),
                });
            }
        }

        // STEP 3: COMMIT + SNAPSHOT
        let counts = working.counts().to_vec();
        self.compartments = working;
        self.round_log.record(round, counts.clone());
        round_events.push(Event::RoundCompleted {
            round,
            counts: counts.clone(),
        });
        self.round += 1;

        // STEP 4: STOP CONDITION
        let exhausted = match &self.config.stop_when_exhausted {
            Some(buckets) => buckets
                .iter()
                .map(|&i| self.compartments.get(i).unwrap_or(0))
                .sum::<u64>()
                == 0,
            None => false,
        };
        let budget_reached = self.round >= self.config.max_rounds;
        let stop_reason = if exhausted {
            Some(StopReason::Exhausted)
        } else if budget_reached {
            Some(StopReason::RoundBudget)
        } else {
            None
        };

        if let Some(reason) = stop_reason {
            self.status = DirectorStatus::Stopped;
            round_events.push(Event::Stopped { round, reason });
        }

        for event in round_events {
            self.event_log.log(event);
        }

        Ok(RoundResult {
            round,
            discrete_ran,
            continuous_ran,
            counts,
            stopped: stop_reason.is_some(),
            stop_reason,
        })
    }

    /// Run rounds until the stop condition holds
    ///
    /// Returns the number of completed rounds.
    pub fn run(&mut self) -> Result<u64, SimulationError> {
        loop {
            let result = self.round()?;
            if result.stopped {
                return Ok(self.round);
            }
        }
    }
}
