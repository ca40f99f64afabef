//! Domain models
//!
//! Shared data types owned by the Director and snapshotted to sub-models.

pub mod compartments;

pub use compartments::{CompartmentError, CompartmentVector};
