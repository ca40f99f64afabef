//! Sub-model contract
//!
//! Every sub-model, discrete or continuous, implements the [`SubModel`]
//! trait. The Director drives registered sub-models through a fixed
//! sequence each round:
//!
//! ```text
//! evaluate gate -> configure -> advance -> reconcile output
//! ```
//!
//! Sub-models receive read-only compartment snapshots and return plain
//! data (a real-valued vector, or an integer transfer count). They never
//! mutate Director state. A sub-model's gate policy and reconciliation
//! policy are declared once and resolved into the Director's registry at
//! registration, replacing any runtime by-name dispatch.
//!
//! A discrete sub-model MAY internally run on a parallel agent runtime;
//! it must present one barrier-synchronized result per round through
//! `advance`. That runtime's synchronization is its own concern.

use crate::gate::GateCondition;
use crate::models::CompartmentVector;
use crate::reconcile::ReconcilePolicy;
use crate::rng::RngManager;
use thiserror::Error;

pub mod contact;
pub mod linear_flow;
pub mod scripted;

pub use contact::ContactModel;
pub use linear_flow::{FlowRate, LinearFlowModel};
pub use scripted::{ScriptedContinuous, ScriptedTransfer};

/// Sub-model kind, fixed per implementation
///
/// Discrete sub-models run first within a round and hand their transfer
/// to the continuous sub-models through the reconciled vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubModelKind {
    /// Agent-based / cellular dynamics producing an integer transfer
    Discrete,
    /// ODE-style dynamics producing a real-valued vector
    Continuous,
}

/// Raw per-round output of a sub-model, before reconciliation
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutput {
    /// One real value per covered bucket; may be fractional and may not
    /// sum to the conserved total (numerical drift)
    Continuous(Vec<f64>),

    /// Integer flow between two named buckets (e.g., new infections
    /// moving Susceptible -> Exposed)
    Transfer {
        source: usize,
        destination: usize,
        count: u64,
    },
}

impl RawOutput {
    /// Short name for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            RawOutput::Continuous(_) => "continuous",
            RawOutput::Transfer { .. } => "transfer",
        }
    }
}

/// Errors raised by sub-model execution
#[derive(Debug, Error, PartialEq)]
pub enum SubModelError {
    /// `advance` could not produce a result (e.g., the underlying
    /// solver failed to converge). Fatal for the current round; the
    /// core never retries.
    #[error("sub-model '{name}' failed to produce a result: {reason}")]
    ExecutionFailed { name: String, reason: String },

    /// A sub-model returned output inconsistent with its declared kind
    #[error("sub-model '{name}' returned {got} output, expected {expected}")]
    OutputMismatch {
        name: String,
        expected: &'static str,
        got: &'static str,
    },
}

/// Read-only per-round snapshot handed to `configure`
#[derive(Debug, Clone, Copy)]
pub struct RoundContext<'a> {
    /// Current round index (0-based)
    pub round: u64,

    /// Conserved total population size
    pub population_size: u64,

    /// Compartment state at the point this sub-model is invoked.
    /// For continuous sub-models this already includes the discrete
    /// transfers applied earlier in the same round.
    pub compartments: &'a CompartmentVector,
}

/// Capability set every sub-model must implement
pub trait SubModel {
    /// Stable name for logs and error messages
    fn name(&self) -> &str;

    /// Discrete or continuous
    fn kind(&self) -> SubModelKind;

    /// Gate policy deciding whether this sub-model runs in a round.
    /// Resolved into the registry once at registration.
    fn call_condition(&self) -> GateCondition;

    /// Remainder policy used when reconciling this sub-model's output
    fn reconcile_policy(&self) -> ReconcilePolicy {
        ReconcilePolicy::LargestRemainder
    }

    /// Bucket indices this sub-model evolves (continuous sub-models
    /// only; the reconciliation target excludes uncovered buckets).
    /// Discrete sub-models return an empty slice.
    fn coverage(&self) -> &[usize] {
        &[]
    }

    /// Prepare internal state for one round from a read-only snapshot.
    /// Called at most once per round, before `advance`.
    fn configure(&mut self, ctx: &RoundContext<'_>) -> Result<(), SubModelError>;

    /// Execute one round of the sub-model's own dynamics.
    ///
    /// Must not mutate the Director's compartment vector; the returned
    /// raw output is reconciled by the Director. All randomness comes
    /// from the Director-owned `rng` so runs replay deterministically.
    fn advance(&mut self, rng: &mut RngManager) -> Result<RawOutput, SubModelError>;
}
