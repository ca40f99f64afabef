//! Well-mixed contact process (discrete sub-model)
//!
//! Samples the number of susceptible individuals exposed this round by
//! a well-mixed contact process: each susceptible independently escapes
//! infection with probability depending on the infectious fraction.
//! Returns a single Susceptible -> Exposed transfer count.
//!
//! This stands in for an external agent-based mobility simulation: the
//! Director only ever sees the synchronized per-round transfer count,
//! exactly as it would from a distributed agent runtime.

use crate::gate::GateCondition;
use crate::rng::RngManager;
use crate::submodel::{RawOutput, RoundContext, SubModel, SubModelError, SubModelKind};

/// Discrete stochastic contact model
///
/// The per-susceptible infection probability for a round is
/// `transmission_rate * infectious / population`, clamped to [0, 1].
#[derive(Debug, Clone)]
pub struct ContactModel {
    name: String,
    susceptible: usize,
    exposed: usize,
    infectious: Vec<usize>,
    transmission_rate: f64,
    // refreshed by configure
    susceptible_count: u64,
    infectious_count: u64,
    population_size: u64,
    configured: bool,
}

impl ContactModel {
    /// Create a contact model moving individuals from the bucket at
    /// `susceptible` to the bucket at `exposed`, driven by the summed
    /// counts of the `infectious` buckets.
    pub fn new(
        name: String,
        susceptible: usize,
        exposed: usize,
        infectious: Vec<usize>,
        transmission_rate: f64,
    ) -> Self {
        assert!(
            transmission_rate >= 0.0,
            "transmission rate must be non-negative"
        );
        Self {
            name,
            susceptible,
            exposed,
            infectious,
            transmission_rate,
            susceptible_count: 0,
            infectious_count: 0,
            population_size: 0,
            configured: false,
        }
    }
}

impl SubModel for ContactModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SubModelKind {
        SubModelKind::Discrete
    }

    fn call_condition(&self) -> GateCondition {
        GateCondition::PopulationGated {
            susceptible: self.susceptible,
            infectious: self.infectious.clone(),
        }
    }

    fn configure(&mut self, ctx: &RoundContext<'_>) -> Result<(), SubModelError> {
        self.susceptible_count = ctx.compartments.get(self.susceptible).ok_or_else(|| {
            SubModelError::ExecutionFailed {
                name: self.name.clone(),
                reason: format!("susceptible bucket {} missing from snapshot", self.susceptible),
            }
        })?;
        self.infectious_count = self
            .infectious
            .iter()
            .map(|&i| ctx.compartments.get(i).unwrap_or(0))
            .sum();
        self.population_size = ctx.population_size;
        self.configured = true;
        Ok(())
    }

    fn advance(&mut self, rng: &mut RngManager) -> Result<RawOutput, SubModelError> {
        if !self.configured {
            return Err(SubModelError::ExecutionFailed {
                name: self.name.clone(),
                reason: "advance called before configure".to_string(),
            });
        }
        self.configured = false;

        if self.population_size == 0 {
            return Ok(RawOutput::Transfer {
                source: self.susceptible,
                destination: self.exposed,
                count: 0,
            });
        }

        let p = self.transmission_rate * self.infectious_count as f64
            / self.population_size as f64;
        let count = rng.binomial(self.susceptible_count, p);

        Ok(RawOutput::Transfer {
            source: self.susceptible,
            destination: self.exposed,
            count,
        })
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

    fn run_once(model: &mut ContactModel, counts: Vec<u64>, seed: u64) -> u64 {
        let compartments = seir(counts);
        let ctx = RoundContext {
            round: 0,
            population_size: compartments.total(),
            compartments: &compartments,
        };
        let mut rng = RngManager::new(seed);
        model.configure(&ctx).unwrap();
        match model.advance(&mut rng).unwrap() {
            RawOutput::Transfer { count, .. } => count,
            other => panic!("expected transfer, got {other:?}"),
        }
    }

    #[test]
    fn test_transfer_bounded_by_susceptibles() {
        let mut model = ContactModel::new("contact".to_string(), 0, 1, vec![1, 2], 10.0);
        let count = run_once(&mut model, vec![50, 500, 450, 0], 42);
        assert!(count <= 50);
    }

    #[test]
    fn test_no_infectious_means_no_transfers() {
        let mut model = ContactModel::new("contact".to_string(), 0, 1, vec![1, 2], 1.0);
        let count = run_once(&mut model, vec![1000, 0, 0, 0], 42);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_deterministic_under_same_seed() {
        let mut a = ContactModel::new("contact".to_string(), 0, 1, vec![1, 2], 0.5);
        let mut b = ContactModel::new("contact".to_string(), 0, 1, vec![1, 2], 0.5);
        let count_a = run_once(&mut a, vec![900, 50, 50, 0], 7);
        let count_b = run_once(&mut b, vec![900, 50, 50, 0], 7);
        assert_eq!(count_a, count_b);
    }

    #[test]
    fn test_declares_population_gate() {
        let model = ContactModel::new("contact".to_string(), 0, 1, vec![1, 2], 0.5);
        assert_eq!(
            model.call_condition(),
            GateCondition::PopulationGated {
                susceptible: 0,
                infectious: vec![1, 2],
            }
        );
    }
}
