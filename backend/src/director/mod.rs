//! Director - sub-model orchestration
//!
//! The Director owns the shared compartment vector and global
//! parameters, and drives the per-round coupling sequence across all
//! registered sub-models. See [`engine`] for the round loop and
//! [`checkpoint`] for pause/resume.

pub mod checkpoint;
pub mod engine;

pub use checkpoint::{config_hash, StateSnapshot};
pub use engine::{
    Director, DirectorConfig, DirectorStatus, RoundResult, SimulationError, SubModelConfig,
};
