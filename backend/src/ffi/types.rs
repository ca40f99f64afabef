//! FFI type conversions
//!
//! Parses Python dict configurations into Rust config structs and
//! converts round results back into Python dicts. The FFI boundary is
//! minimal: plain dicts, lists, strings, and integers only.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::director::{DirectorConfig, RoundResult, SubModelConfig};
use crate::events::StopReason;
use crate::gate::GateCondition;
use crate::reconcile::ReconcilePolicy;
use crate::submodel::FlowRate;

fn required<'py, T: FromPyObject<'py>>(dict: &Bound<'py, PyDict>, key: &str) -> PyResult<T> {
    match dict.get_item(key)? {
        Some(value) => value.extract(),
        None => Err(PyValueError::new_err(format!(
            "missing required config field '{key}'"
        ))),
    }
}

fn optional<'py, T: FromPyObject<'py>>(
    dict: &Bound<'py, PyDict>,
    key: &str,
) -> PyResult<Option<T>> {
    match dict.get_item(key)? {
        Some(value) if !value.is_none() => Ok(Some(value.extract()?)),
        _ => Ok(None),
    }
}

/// Parse the complete director configuration from a Python dict
pub fn parse_director_config(dict: &Bound<'_, PyDict>) -> PyResult<DirectorConfig> {
    let submodel_configs = match dict.get_item("submodel_configs")? {
        Some(list) => {
            let list: Bound<'_, PyList> = list.extract()?;
            let mut configs = Vec::with_capacity(list.len());
            for item in list.iter() {
                let item: Bound<'_, PyDict> = item.extract()?;
                configs.push(parse_submodel_config(&item)?);
            }
            configs
        }
        None => Vec::new(),
    };

    Ok(DirectorConfig {
        population_size: required(dict, "population_size")?,
        compartment_labels: required(dict, "compartment_labels")?,
        initial_counts: required(dict, "initial_counts")?,
        max_rounds: required(dict, "max_rounds")?,
        stop_when_exhausted: optional(dict, "stop_when_exhausted")?,
        rng_seed: optional(dict, "rng_seed")?.unwrap_or(1),
        submodel_configs,
    })
}

fn parse_submodel_config(dict: &Bound<'_, PyDict>) -> PyResult<SubModelConfig> {
    let kind: String = required(dict, "type")?;
    match kind.as_str() {
        "LinearFlow" => Ok(SubModelConfig::LinearFlow {
            name: required(dict, "name")?,
            coverage: required(dict, "coverage")?,
            flows: parse_flows(dict)?,
            duration: required(dict, "duration")?,
            steps: required(dict, "steps")?,
            gate: parse_gate(dict)?,
            policy: parse_policy(dict)?,
        }),
        "Contact" => Ok(SubModelConfig::Contact {
            name: required(dict, "name")?,
            susceptible: required(dict, "susceptible")?,
            exposed: required(dict, "exposed")?,
            infectious: required(dict, "infectious")?,
            transmission_rate: required(dict, "transmission_rate")?,
        }),
        other => Err(PyValueError::new_err(format!(
            "unknown sub-model type '{other}' (expected 'LinearFlow' or 'Contact')"
        ))),
    }
}

fn parse_flows(dict: &Bound<'_, PyDict>) -> PyResult<Vec<FlowRate>> {
    let list: Bound<'_, PyList> = required(dict, "flows")?;
    let mut flows = Vec::with_capacity(list.len());
    for item in list.iter() {
        let item: Bound<'_, PyDict> = item.extract()?;
        flows.push(FlowRate {
            source: required(&item, "source")?,
            destination: required(&item, "destination")?,
            rate: required(&item, "rate")?,
        });
    }
    Ok(flows)
}

fn parse_gate(dict: &Bound<'_, PyDict>) -> PyResult<Option<GateCondition>> {
    let Some(gate) = dict.get_item("gate")? else {
        return Ok(None);
    };
    if gate.is_none() {
        return Ok(None);
    }
    let gate: Bound<'_, PyDict> = gate.extract()?;
    let kind: String = required(&gate, "type")?;
    let condition = match kind.as_str() {
        "Always" => GateCondition::Always,
        "Periodic" => GateCondition::Periodic {
            frequency: required(&gate, "frequency")?,
        },
        "PopulationGated" => GateCondition::PopulationGated {
            susceptible: required(&gate, "susceptible")?,
            infectious: required(&gate, "infectious")?,
        },
        other => {
            return Err(PyValueError::new_err(format!(
                "unknown gate type '{other}'"
            )));
        }
    };
    Ok(Some(condition))
}

fn parse_policy(dict: &Bound<'_, PyDict>) -> PyResult<Option<ReconcilePolicy>> {
    let Some(policy) = optional::<String>(dict, "policy")? else {
        return Ok(None);
    };
    match policy.as_str() {
        "largest_remainder" => Ok(Some(ReconcilePolicy::LargestRemainder)),
        "greedy_largest_bucket" => Ok(Some(ReconcilePolicy::GreedyLargestBucket)),
        other => Err(PyValueError::new_err(format!(
            "unknown reconcile policy '{other}'"
        ))),
    }
}

/// Convert a round result into a Python dict
pub fn round_result_to_py(py: Python<'_>, result: &RoundResult) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("round", result.round)?;
    dict.set_item("discrete_ran", result.discrete_ran)?;
    dict.set_item("continuous_ran", result.continuous_ran)?;
    dict.set_item("counts", result.counts.clone())?;
    dict.set_item("stopped", result.stopped)?;
    dict.set_item(
        "stop_reason",
        result.stop_reason.map(|reason| match reason {
            StopReason::Exhausted => "exhausted",
            StopReason::RoundBudget => "round_budget",
        }),
    )?;
    Ok(dict.into())
}
