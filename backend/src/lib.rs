//! Multilevel Simulator Core - Rust Engine
//!
//! Coupling layer for multi-level simulations: a discrete sub-model
//! (agent-based interaction) and a continuous sub-model (ODE-style
//! aggregate dynamics) exchange state through a Director that enforces
//! a global conservation invariant on the shared compartment vector.
//!
//! # Architecture
//!
//! - **models**: Compartment vector (named buckets, integer counts)
//! - **reconcile**: Conservation reconciliation (largest-remainder and
//!   greedy-largest-bucket policies, clamped discrete transfers)
//! - **gate**: Call-condition gates (population-gated, periodic)
//! - **submodel**: Sub-model contract and built-in sub-models
//! - **director**: Round loop, registry, checkpointing
//! - **report**: Stable per-round results lines
//! - **events**: Diagnostic event log for replay and auditing
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. The compartment vector always sums to the population size
//! 2. All randomness is deterministic (seeded RNG)
//! 3. Rounds are atomic: a failed round commits nothing

// Module declarations
pub mod director;
pub mod events;
pub mod gate;
pub mod models;
pub mod reconcile;
pub mod report;
pub mod rng;
pub mod submodel;

// Re-exports for convenience
pub use director::{
    config_hash, Director, DirectorConfig, DirectorStatus, RoundResult, SimulationError,
    StateSnapshot, SubModelConfig,
};
pub use events::{Event, EventLog, StopReason};
pub use gate::GateCondition;
pub use models::{CompartmentError, CompartmentVector};
pub use reconcile::{ReconcileError, ReconcilePolicy};
pub use report::{RoundLog, RoundRecord};
pub use rng::RngManager;
pub use submodel::{
    ContactModel, FlowRate, LinearFlowModel, RawOutput, RoundContext, ScriptedContinuous,
    ScriptedTransfer, SubModel, SubModelError, SubModelKind,
};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn multilevel_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::director::PyDirector>()?;
    Ok(())
}
