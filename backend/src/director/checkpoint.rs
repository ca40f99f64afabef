//! Checkpoint - save/load Director state
//!
//! Serializes the Director's round position, compartment state, RNG
//! state, and result log for pause/resume.
//!
//! # Critical Invariants
//!
//! - **Determinism**: restoring a snapshot and continuing produces the
//!   same rounds as the uninterrupted run (the RNG state is part of the
//!   snapshot)
//! - **Conservation**: snapshot counts must sum to the population size
//! - **Config matching**: a snapshot only loads against the exact
//!   config it was taken from, enforced by a SHA-256 hash of the
//!   serialized config
//!
//! Built-in sub-models are rebuilt from the config on restore; they
//! carry no cross-round state. Dynamically registered trait objects are
//! the caller's responsibility and must be re-registered before the
//! first resumed round.

use crate::director::engine::{Director, DirectorConfig, DirectorStatus, SimulationError};
use crate::report::{RoundLog, RoundRecord};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Complete director state snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Unique identifier for the run this snapshot belongs to
    pub run_id: String,

    /// Completed rounds at the time of the snapshot
    pub round: u64,

    /// Lifecycle state (a `Stopped` snapshot restores as stopped)
    pub status: DirectorStatus,

    /// Bucket labels, for sanity checking against the config
    pub labels: Vec<String>,

    /// Compartment counts at the snapshot point
    pub counts: Vec<u64>,

    /// RNG state (CRITICAL for deterministic resume)
    pub rng_state: u64,

    /// Per-round snapshots recorded so far
    pub round_records: Vec<RoundRecord>,

    /// SHA-256 hash of the serialized config (for validation)
    pub config_hash: String,
}

/// SHA-256 hash of the serialized configuration
pub fn config_hash(config: &DirectorConfig) -> Result<String, SimulationError> {
    let serialized = serde_json::to_string(config)
        .map_err(|e| SimulationError::Checkpoint(format!("config serialization failed: {e}")))?;
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

impl StateSnapshot {
    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String, SimulationError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SimulationError::Checkpoint(format!("snapshot serialization failed: {e}")))
    }

    /// Deserialize from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json)
            .map_err(|e| SimulationError::Checkpoint(format!("snapshot parse failed: {e}")))
    }
}

impl Director {
    /// Capture the current state as a snapshot
    pub fn snapshot(&self) -> Result<StateSnapshot, SimulationError> {
        Ok(StateSnapshot {
            run_id: Uuid::new_v4().to_string(),
            round: self.current_round(),
            status: self.status(),
            labels: self.compartments().labels().to_vec(),
            counts: self.compartments().counts().to_vec(),
            rng_state: self.rng_state(),
            round_records: self.round_log().records().to_vec(),
            config_hash: config_hash(self.config())?,
        })
    }

    /// Rebuild a director from a config and a snapshot taken against it
    ///
    /// # Errors
    ///
    /// Returns `SimulationError::Checkpoint` if the config hash does
    /// not match, the labels differ, or the snapshot counts break the
    /// conservation invariant.
    pub fn restore(
        config: DirectorConfig,
        snapshot: StateSnapshot,
    ) -> Result<Director, SimulationError> {
        let expected_hash = config_hash(&config)?;
        if expected_hash != snapshot.config_hash {
            return Err(SimulationError::Checkpoint(
                "snapshot was taken against a different config".to_string(),
            ));
        }
        if snapshot.labels != config.compartment_labels {
            return Err(SimulationError::Checkpoint(
                "snapshot labels do not match config".to_string(),
            ));
        }

        // a mid-run snapshot restores as Idle so callers can re-attach
        // dynamically registered sub-models; the next round() call
        // moves the director back to Running
        let status = match snapshot.status {
            DirectorStatus::Running => DirectorStatus::Idle,
            other => other,
        };

        let mut director = Director::new(config)?;
        let round_log = RoundLog::from_records(snapshot.labels, snapshot.round_records);
        director.restore_state(
            snapshot.round,
            status,
            snapshot.counts,
            snapshot.rng_state,
            round_log,
        )?;
        Ok(director)
    }
}
