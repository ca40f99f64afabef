//! Python FFI boundary (feature = "pyo3")
//!
//! Minimal and safe: dict/list/int conversions at the edge, all
//! simulation logic stays on the Rust side.

pub mod director;
pub mod types;
