//! Scripted sub-models for deterministic testing
//!
//! Replay a fixed sequence of outputs, one per invoked round. Used by
//! integration tests to drive the Director through exact scenarios
//! (known transfers, known raw vectors, forced failures).
//!
//! NOTE: Available in all builds to support integration testing, but
//! should only be used in test code.

use crate::gate::GateCondition;
use crate::reconcile::ReconcilePolicy;
use crate::rng::RngManager;
use crate::submodel::{RawOutput, RoundContext, SubModel, SubModelError, SubModelKind};
use std::collections::VecDeque;

/// Continuous sub-model replaying pre-scripted raw vectors
#[derive(Debug, Clone)]
pub struct ScriptedContinuous {
    name: String,
    coverage: Vec<usize>,
    outputs: VecDeque<Vec<f64>>,
    gate: GateCondition,
    policy: ReconcilePolicy,
}

impl ScriptedContinuous {
    pub fn new(name: String, coverage: Vec<usize>, outputs: Vec<Vec<f64>>) -> Self {
        Self {
            name,
            coverage,
            outputs: outputs.into(),
            gate: GateCondition::Always,
            policy: ReconcilePolicy::LargestRemainder,
        }
    }

    pub fn with_gate(mut self, gate: GateCondition) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl SubModel for ScriptedContinuous {
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

    fn configure(&mut self, _ctx: &RoundContext<'_>) -> Result<(), SubModelError> {
        Ok(())
    }

    fn advance(&mut self, _rng: &mut RngManager) -> Result<RawOutput, SubModelError> {
        match self.outputs.pop_front() {
            Some(values) => Ok(RawOutput::Continuous(values)),
            None => Err(SubModelError::ExecutionFailed {
                name: self.name.clone(),
                reason: "script exhausted".to_string(),
            }),
        }
    }
}

/// Discrete sub-model replaying pre-scripted transfer counts
#[derive(Debug, Clone)]
pub struct ScriptedTransfer {
    name: String,
    source: usize,
    destination: usize,
    counts: VecDeque<u64>,
    gate: GateCondition,
}

impl ScriptedTransfer {
    pub fn new(name: String, source: usize, destination: usize, counts: Vec<u64>) -> Self {
        Self {
            name,
            source,
            destination,
            counts: counts.into(),
            gate: GateCondition::Always,
        }
    }

    pub fn with_gate(mut self, gate: GateCondition) -> Self {
        self.gate = gate;
        self
    }
}

impl SubModel for ScriptedTransfer {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SubModelKind {
        SubModelKind::Discrete
    }

    fn call_condition(&self) -> GateCondition {
        self.gate.clone()
    }

    fn configure(&mut self, _ctx: &RoundContext<'_>) -> Result<(), SubModelError> {
        Ok(())
    }

    fn advance(&mut self, _rng: &mut RngManager) -> Result<RawOutput, SubModelError> {
        match self.counts.pop_front() {
            Some(count) => Ok(RawOutput::Transfer {
                source: self.source,
                destination: self.destination,
                count,
            }),
            None => Err(SubModelError::ExecutionFailed {
                name: self.name.clone(),
                reason: "script exhausted".to_string(),
            }),
        }
    }
}
