//! Generic linear-flow continuous sub-model
//!
//! Forward-Euler integration of a user-supplied linear transition-rate
//! matrix over a subset of buckets. Compartment chains like E -> I -> R
//! or fleet transitions like Petroil -> LPG -> Electric are expressed
//! as configuration (a list of per-unit flow rates), not as hardcoded
//! equations.
//!
//! The model is reconfigured from the live compartment snapshot every
//! round, so it carries no cross-round state of its own.

use crate::gate::GateCondition;
use crate::reconcile::ReconcilePolicy;
use crate::rng::RngManager;
use crate::submodel::{RawOutput, RoundContext, SubModel, SubModelError, SubModelKind};
use serde::{Deserialize, Serialize};

/// One linear flow: `rate` fraction of `source` moves toward
/// `destination` per unit time
///
/// Indices are global bucket indices and must lie inside the model's
/// coverage set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRate {
    pub source: usize,
    pub destination: usize,
    pub rate: f64,
}

/// Continuous sub-model integrating linear inter-bucket flows
///
/// # Example
/// ```
/// use multilevel_simulator_core_rs::submodel::{FlowRate, LinearFlowModel};
///
/// // E -> I at rate 1.0, I -> R at rate 0.1, over buckets 1..=3
/// let model = LinearFlowModel::new(
///     "eir".to_string(),
///     vec![1, 2, 3],
///     vec![
///         FlowRate { source: 1, destination: 2, rate: 1.0 },
///         FlowRate { source: 2, destination: 3, rate: 0.1 },
///     ],
///     0.15,
///     1000,
/// );
/// ```
#[derive(Debug, Clone)]
pub struct LinearFlowModel {
    name: String,
    coverage: Vec<usize>,
    flows: Vec<FlowRate>,
    /// Integration window per round
    duration: f64,
    /// Euler steps per window
    steps: u32,
    gate: GateCondition,
    policy: ReconcilePolicy,
    /// Working values for covered buckets, refreshed by `configure`
    state: Vec<f64>,
    configured: bool,
}

impl LinearFlowModel {
    /// Create a new linear-flow model over the given covered buckets
    ///
    /// # Panics
    ///
    /// Panics if a flow endpoint is outside the coverage set, if
    /// `duration` is not positive, or if `steps` is zero. These are
    /// programmer errors; user-facing validation happens when the model
    /// is registered with a Director.
    pub fn new(
        name: String,
        coverage: Vec<usize>,
        flows: Vec<FlowRate>,
        duration: f64,
        steps: u32,
    ) -> Self {
        assert!(duration > 0.0, "integration duration must be positive");
        assert!(steps > 0, "Euler integration needs at least one step");
        for flow in &flows {
            assert!(
                coverage.contains(&flow.source) && coverage.contains(&flow.destination),
                "flow {} -> {} references a bucket outside coverage",
                flow.source,
                flow.destination
            );
        }
        let state = vec![0.0; coverage.len()];
        Self {
            name,
            coverage,
            flows,
            duration,
            steps,
            gate: GateCondition::Always,
            policy: ReconcilePolicy::LargestRemainder,
            state,
            configured: false,
        }
    }

    /// Override the default `Always` gate (e.g., run every N rounds)
    pub fn with_gate(mut self, gate: GateCondition) -> Self {
        self.gate = gate;
        self
    }

    /// Override the default largest-remainder reconciliation policy
    pub fn with_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Slot in `state` for a global bucket index
    fn slot(&self, bucket: usize) -> usize {
        // coverage membership checked at construction
        self.coverage
            .iter()
            .position(|&b| b == bucket)
            .unwrap_or(0)
    }
}

impl SubModel for LinearFlowModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SubModelKind {
        SubModelKind::Continuous
    }

    fn call_condition(&self) -> GateCondition {
        self.gate.clone()
    }

    fn reconcile_policy(&self) -> ReconcilePolicy {
        self.policy
    }

    fn coverage(&self) -> &[usize] {
        &self.coverage
    }

    fn configure(&mut self, ctx: &RoundContext<'_>) -> Result<(), SubModelError> {
        for (slot, &bucket) in self.coverage.iter().enumerate() {
            let count = ctx.compartments.get(bucket).ok_or_else(|| {
                SubModelError::ExecutionFailed {
                    name: self.name.clone(),
                    reason: format!("covered bucket {bucket} missing from snapshot"),
                }
            })?;
            self.state[slot] = count as f64;
        }
        self.configured = true;
        Ok(())
    }

    fn advance(&mut self, _rng: &mut RngManager) -> Result<RawOutput, SubModelError> {
        if !self.configured {
            return Err(SubModelError::ExecutionFailed {
                name: self.name.clone(),
                reason: "advance called before configure".to_string(),
            });
        }
        self.configured = false;

        let dt = self.duration / self.steps as f64;
        let mut deltas = vec![0.0; self.state.len()];
        for _ in 0..self.steps {
            for delta in deltas.iter_mut() {
                *delta = 0.0;
            }
            for flow in &self.flows {
                let from = self.slot(flow.source);
                let to = self.slot(flow.destination);
                let moved = flow.rate * self.state[from] * dt;
                deltas[from] -= moved;
                deltas[to] += moved;
            }
            for (value, delta) in self.state.iter_mut().zip(&deltas) {
                // Euler can overshoot into negative territory for large
                // rate*dt; the reconciler clamps, but keep the working
                // state physical
                *value = (*value + delta).max(0.0);
            }
        }

        Ok(RawOutput::Continuous(self.state.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CompartmentVector;

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

    fn eir_model() -> LinearFlowModel {
        LinearFlowModel::new(
            "eir".to_string(),
            vec![1, 2, 3],
            vec![
                FlowRate {
                    source: 1,
                    destination: 2,
                    rate: 1.0,
                },
                FlowRate {
                    source: 2,
                    destination: 3,
                    rate: 0.1,
                },
            ],
            0.15,
            1000,
        )
    }

    #[test]
    fn test_mass_is_preserved_by_integration() {
        let mut model = eir_model();
        let compartments = seir(vec![975, 25, 0, 0]);
        let ctx = RoundContext {
            round: 0,
            population_size: 1000,
            compartments: &compartments,
        };
        let mut rng = RngManager::new(1);

        model.configure(&ctx).unwrap();
        let output = model.advance(&mut rng).unwrap();
        let RawOutput::Continuous(values) = output else {
            panic!("expected continuous output");
        };

        assert_eq!(values.len(), 3);
        let mass: f64 = values.iter().sum();
        assert!(
            (mass - 25.0).abs() < 1e-6,
            "linear flows must conserve mass, got {mass}"
        );
        // some E has flowed onward
        assert!(values[0] < 25.0);
        assert!(values[1] > 0.0);
    }

    #[test]
    fn test_advance_without_configure_fails() {
        let mut model = eir_model();
        let mut rng = RngManager::new(1);
        let err = model.advance(&mut rng).unwrap_err();
        assert!(matches!(err, SubModelError::ExecutionFailed { .. }));
    }

    #[test]
    #[should_panic(expected = "references a bucket outside coverage")]
    fn test_flow_outside_coverage_panics() {
        LinearFlowModel::new(
            "bad".to_string(),
            vec![1, 2],
            vec![FlowRate {
                source: 1,
                destination: 3,
                rate: 0.5,
            }],
            1.0,
            10,
        );
    }
}
