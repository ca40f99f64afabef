//! Event logging for simulation replay and auditing
//!
//! Captures every significant coupling decision during a run:
//! - gate evaluations that skipped a sub-model
//! - discrete transfers, with requested vs. clamped counts
//! - continuous reconciliations, with the deficit that was distributed
//! - round completions and the final stop
//!
//! The event log is diagnostic only. The stable external output is the
//! results line rendered by [`crate::report::RoundLog`].

use crate::reconcile::ReconcilePolicy;
use serde::{Deserialize, Serialize};

/// Why the Director stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The configured exhaustion buckets all reached zero
    Exhausted,
    /// The round budget was reached
    RoundBudget,
}

/// Simulation event capturing one coupling decision
///
/// All events include a round number for temporal ordering. Events are
/// logged in the order they occur within a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A sub-model's gate evaluated false; it was not invoked
    GateSkipped { round: u64, submodel: String },

    /// A discrete transfer was reconciled into the compartments
    TransferApplied {
        round: u64,
        submodel: String,
        source: usize,
        destination: usize,
        /// Count the sub-model asked for
        requested: u64,
        /// Count after clamping to the source bucket
        applied: u64,
    },

    /// A continuous result was reconciled into the compartments
    ContinuousReconciled {
        round: u64,
        submodel: String,
        policy: ReconcilePolicy,
        /// Conservation target for the covered buckets
        target: u64,
        /// Units added back by the remainder policy
        deficit: u64,
    },

    /// All gated sub-models ran and reconciled; snapshot appended
    RoundCompleted { round: u64, counts: Vec<u64> },

    /// The stop condition held after this round
    Stopped { round: u64, reason: StopReason },
}

impl Event {
    /// Round this event belongs to
    pub fn round(&self) -> u64 {
        match self {
            Event::GateSkipped { round, .. }
            | Event::TransferApplied { round, .. }
            | Event::ContinuousReconciled { round, .. }
            | Event::RoundCompleted { round, .. }
            | Event::Stopped { round, .. } => *round,
        }
    }
}

/// Append-only event log
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All events in logged order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Events belonging to a specific round
    pub fn events_for_round(&self, round: u64) -> Vec<&Event> {
        self.events.iter().filter(|e| e.round() == round).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_and_filter_by_round() {
        let mut log = EventLog::new();
        log.log(Event::GateSkipped {
            round: 0,
            submodel: "mobility".to_string(),
        });
        log.log(Event::RoundCompleted {
            round: 0,
            counts: vec![990, 10],
        });
        log.log(Event::RoundCompleted {
            round: 1,
            counts: vec![980, 20],
        });

        assert_eq!(log.len(), 3);
        assert_eq!(log.events_for_round(0).len(), 2);
        assert_eq!(log.events_for_round(1).len(), 1);
        assert_eq!(log.events()[2].round(), 1);
    }
}
