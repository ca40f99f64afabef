//! Call-condition gates
//!
//! A gate decides whether invoking a sub-model in the current round is
//! meaningful. Gates are evaluated by the Director before `configure`
//! and `advance`, are pure with respect to Director state, and are
//! deterministic given their inputs.
//!
//! # Policies
//!
//! - **PopulationGated**: for discrete interaction sub-models. Running
//!   an agent-interaction simulation is pointless with nobody left to
//!   infect or nobody infectious to do the infecting.
//! - **Periodic**: for continuous regulation sub-models invoked only
//!   every N rounds (e.g., a predator-prey correction).
//! - **Always**: for continuous sub-models that run every round.

use crate::models::CompartmentVector;
use serde::{Deserialize, Serialize};

/// Gate policy attached to a sub-model at registration
///
/// # Example
/// ```
/// use multilevel_simulator_core_rs::{CompartmentVector, GateCondition};
///
/// let compartments = CompartmentVector::new(
///     vec!["S".to_string(), "E".to_string(), "I".to_string(), "R".to_string()],
///     vec![990, 10, 0, 0],
/// ).unwrap();
///
/// let gate = GateCondition::PopulationGated {
///     susceptible: 0,
///     infectious: vec![1, 2],
/// };
/// assert!(gate.evaluate(&compartments, 0));
///
/// let every_ten = GateCondition::Periodic { frequency: 10 };
/// assert!(every_ten.evaluate(&compartments, 20));
/// assert!(!every_ten.evaluate(&compartments, 21));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateCondition {
    /// True iff the susceptible-like bucket is strictly positive AND
    /// the sum of the infectious-like buckets is strictly positive
    PopulationGated {
        /// Index of the susceptible-like bucket
        susceptible: usize,
        /// Indices of the infectious-like buckets (e.g., E and I)
        infectious: Vec<usize>,
    },

    /// True iff `round % frequency == 0` (rounds 0, f, 2f, ...)
    Periodic {
        /// Call frequency in rounds, must be >= 1
        frequency: u64,
    },

    /// Unconditionally true
    Always,
}

impl GateCondition {
    /// Evaluate the gate for the given compartment snapshot and round index
    ///
    /// Out-of-range bucket indices read as zero; the Director rejects
    /// them at registration, so this path only matters for defensive
    /// evaluation against arbitrary snapshots.
    pub fn evaluate(&self, compartments: &CompartmentVector, round: u64) -> bool {
        match self {
            GateCondition::PopulationGated {
                susceptible,
                infectious,
            } => {
                let susceptible_count = compartments.get(*susceptible).unwrap_or(0);
                let infectious_count: u64 = infectious
                    .iter()
                    .map(|&i| compartments.get(i).unwrap_or(0))
                    .sum();
                susceptible_count > 0 && infectious_count > 0
            }
            GateCondition::Periodic { frequency } => {
                // frequency == 0 is rejected at registration; treat it
                // as never-callable rather than dividing by zero
                *frequency > 0 && round % *frequency == 0
            }
            GateCondition::Always => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seir(counts: Vec<u64>) -> CompartmentVector {
        CompartmentVector::new(
            vec![
                "S".to_string(),
                "E".to_string(),
                "I".to_string(),
                "R".to_string(),
            ],
            counts,
        )
        .unwrap()
    }

    #[test]
    fn test_population_gate_requires_both_sides() {
        let gate = GateCondition::PopulationGated {
            susceptible: 0,
            infectious: vec![1, 2],
        };

        assert!(gate.evaluate(&seir(vec![990, 10, 0, 0]), 0));
        assert!(gate.evaluate(&seir(vec![1, 0, 1, 998]), 5));

        // no susceptibles: false regardless of other buckets
        assert!(!gate.evaluate(&seir(vec![0, 500, 500, 0]), 0));
        // nobody infectious: false
        assert!(!gate.evaluate(&seir(vec![1000, 0, 0, 0]), 0));
    }

    #[test]
    fn test_periodic_gate_multiples_only() {
        let gate = GateCondition::Periodic { frequency: 10 };
        let c = seir(vec![990, 10, 0, 0]);

        for round in [0, 10, 20, 100] {
            assert!(gate.evaluate(&c, round), "expected true at round {round}");
        }
        for round in [1, 9, 11, 25] {
            assert!(!gate.evaluate(&c, round), "expected false at round {round}");
        }
    }

    #[test]
    fn test_periodic_gate_zero_frequency_never_fires() {
        let gate = GateCondition::Periodic { frequency: 0 };
        assert!(!gate.evaluate(&seir(vec![1000, 0, 0, 0]), 0));
    }

    #[test]
    fn test_always_gate() {
        let gate = GateCondition::Always;
        assert!(gate.evaluate(&seir(vec![0, 0, 0, 1000]), 7));
    }

    #[test]
    fn test_out_of_range_bucket_reads_zero() {
        let gate = GateCondition::PopulationGated {
            susceptible: 9,
            infectious: vec![1],
        };
        assert!(!gate.evaluate(&seir(vec![990, 10, 0, 0]), 0));
    }
}
