//! PyO3 wrapper for the Director
//!
//! Provides the Python interface to the Rust coupling core. The
//! original multilevel experiments were Python-hosted; this wrapper
//! lets those drivers keep their shape while the round loop,
//! reconciliation, and gating run in Rust.
//!
//! # Example (from Python)
//!
//! ```python
//! from multilevel_simulator._core import Director
//!
//! config = {
//!     "population_size": 1000,
//!     "compartment_labels": ["S", "E", "I", "R"],
//!     "initial_counts": [990, 10, 0, 0],
//!     "max_rounds": 20,
//!     "stop_when_exhausted": [1, 2],
//!     "rng_seed": 12345,
//!     "submodel_configs": [
//!         {
//!             "type": "Contact",
//!             "name": "mobility",
//!             "susceptible": 0,
//!             "exposed": 1,
//!             "infectious": [1, 2],
//!             "transmission_rate": 0.8,
//!         },
//!         {
//!             "type": "LinearFlow",
//!             "name": "eir",
//!             "coverage": [1, 2, 3],
//!             "flows": [
//!                 {"source": 1, "destination": 2, "rate": 1.0},
//!                 {"source": 2, "destination": 3, "rate": 0.1},
//!             ],
//!             "duration": 0.15,
//!             "steps": 1000,
//!         },
//!     ],
//! }
//!
//! director = Director.new(config)
//! result = director.round()
//! print(result["counts"], result["stopped"])
//! ```

use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use super::types::{parse_director_config, round_result_to_py};
use crate::director::{Director as RustDirector, DirectorStatus, StateSnapshot};

/// Python wrapper for the Rust Director
#[pyclass(name = "Director")]
pub struct PyDirector {
    inner: RustDirector,
}

#[pymethods]
impl PyDirector {
    /// Create a new director from a configuration dict
    ///
    /// Raises ValueError for malformed dicts and RuntimeError for
    /// configurations the core rejects (bad sums, bad indices).
    #[staticmethod]
    fn new(config: &Bound<'_, PyDict>) -> PyResult<Self> {
        let rust_config = parse_director_config(config)?;
        let inner = RustDirector::new(rust_config).map_err(|e| {
            PyRuntimeError::new_err(format!("failed to create director: {e}"))
        })?;
        Ok(PyDirector { inner })
    }

    /// Execute one coupling round
    ///
    /// Returns a dict with `round`, `discrete_ran`, `continuous_ran`,
    /// `counts`, `stopped`, and `stop_reason`.
    fn round(&mut self, py: Python<'_>) -> PyResult<Py<PyDict>> {
        let result = self
            .inner
            .round()
            .map_err(|e| PyRuntimeError::new_err(format!("round execution failed: {e}")))?;
        round_result_to_py(py, &result)
    }

    /// Run rounds until the stop condition holds; returns rounds executed
    fn run(&mut self) -> PyResult<u64> {
        self.inner
            .run()
            .map_err(|e| PyRuntimeError::new_err(format!("run failed: {e}")))
    }

    /// Number of completed rounds
    fn current_round(&self) -> u64 {
        self.inner.current_round()
    }

    /// Lifecycle state: "idle", "running", or "stopped"
    fn status(&self) -> &'static str {
        match self.inner.status() {
            DirectorStatus::Idle => "idle",
            DirectorStatus::Running => "running",
            DirectorStatus::Stopped => "stopped",
        }
    }

    /// Current count of the named compartment, or None if unknown
    fn compartment(&self, label: &str) -> Option<u64> {
        self.inner.compartments().get_by_label(label)
    }

    /// All compartments as a dict of label -> count
    fn compartments(&self, py: Python<'_>) -> PyResult<Py<PyDict>> {
        let dict = PyDict::new_bound(py);
        let state = self.inner.compartments();
        for (label, &count) in state.labels().iter().zip(state.counts()) {
            dict.set_item(label, count)?;
        }
        Ok(dict.into())
    }

    /// Rendered results lines, one per completed round
    fn results_lines(&self) -> Vec<String> {
        self.inner.results_lines()
    }

    /// Serialize the current state to a checkpoint JSON string
    fn save_checkpoint(&self) -> PyResult<String> {
        let snapshot = self
            .inner
            .snapshot()
            .map_err(|e| PyRuntimeError::new_err(format!("checkpoint failed: {e}")))?;
        snapshot
            .to_json()
            .map_err(|e| PyRuntimeError::new_err(format!("checkpoint failed: {e}")))
    }

    /// Rebuild a director from a config dict and a checkpoint string
    #[staticmethod]
    fn restore(config: &Bound<'_, PyDict>, checkpoint: &str) -> PyResult<Self> {
        let rust_config = parse_director_config(config)?;
        let snapshot = StateSnapshot::from_json(checkpoint)
            .map_err(|e| PyRuntimeError::new_err(format!("restore failed: {e}")))?;
        let inner = RustDirector::restore(rust_config, snapshot)
            .map_err(|e| PyRuntimeError::new_err(format!("restore failed: {e}")))?;
        Ok(PyDirector { inner })
    }
}
