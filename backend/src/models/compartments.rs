//! Compartment vector model
//!
//! Represents the aggregate population state shared between sub-models:
//! an ordered set of named buckets (e.g., Susceptible/Exposed/Infectious/
//! Recovered, or Petroil/LPG/Electric), each holding a non-negative
//! integer count of individuals.
//!
//! # Critical Invariants
//!
//! 1. All counts are u64 (whole individuals, never fractional)
//! 2. The sum of all buckets equals the conserved population size for
//!    the entire simulation lifetime
//! 3. Only the Director mutates a live vector; sub-models receive
//!    read-only snapshots

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur constructing or mutating a compartment vector
#[derive(Debug, Error, PartialEq)]
pub enum CompartmentError {
    #[error("compartment vector must have at least one bucket")]
    Empty,

    #[error("label count {labels} does not match count vector length {counts}")]
    LengthMismatch { labels: usize, counts: usize },

    #[error("duplicate compartment label: {0}")]
    DuplicateLabel(String),

    #[error("no compartment at index {0}")]
    UnknownIndex(usize),
}

/// Ordered mapping from named buckets to non-negative integer counts
///
/// # Example
/// ```
/// use multilevel_simulator_core_rs::CompartmentVector;
///
/// let compartments = CompartmentVector::new(
///     vec!["S".to_string(), "E".to_string(), "I".to_string(), "R".to_string()],
///     vec![990, 10, 0, 0],
/// ).unwrap();
///
/// assert_eq!(compartments.total(), 1000);
/// assert_eq!(compartments.get(0), Some(990));
/// assert_eq!(compartments.get_by_label("E"), Some(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompartmentVector {
    /// Bucket names, in defined iteration order
    labels: Vec<String>,

    /// Bucket counts, parallel to `labels`
    counts: Vec<u64>,
}

impl CompartmentVector {
    /// Create a new compartment vector from labels and initial counts
    ///
    /// # Errors
    ///
    /// Returns `CompartmentError` if the vector is empty, the lengths
    /// differ, or a label appears twice.
    pub fn new(labels: Vec<String>, counts: Vec<u64>) -> Result<Self, CompartmentError> {
        if labels.is_empty() {
            return Err(CompartmentError::Empty);
        }
        if labels.len() != counts.len() {
            return Err(CompartmentError::LengthMismatch {
                labels: labels.len(),
                counts: counts.len(),
            });
        }
        let mut seen = std::collections::HashSet::new();
        for label in &labels {
            if !seen.insert(label) {
                return Err(CompartmentError::DuplicateLabel(label.clone()));
            }
        }
        Ok(Self { labels, counts })
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if the vector has no buckets (cannot happen post-construction)
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Bucket labels in defined order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Bucket counts in defined order
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Count in bucket `index`, or None if out of range
    pub fn get(&self, index: usize) -> Option<u64> {
        self.counts.get(index).copied()
    }

    /// Count in the bucket named `label`, or None if unknown
    pub fn get_by_label(&self, label: &str) -> Option<u64> {
        self.index_of(label).and_then(|i| self.get(i))
    }

    /// Index of the bucket named `label`
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Sum of all bucket counts
    ///
    /// Under the conservation invariant this equals the configured
    /// population size after every reconciliation.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Replace all counts at once, preserving labels
    ///
    /// Used by the Director to commit a reconciled result. The labels
    /// and bucket count are fixed at construction.
    ///
    /// # Errors
    ///
    /// Returns `CompartmentError::LengthMismatch` if `counts` has the
    /// wrong length.
    pub fn replace_counts(&mut self, counts: Vec<u64>) -> Result<(), CompartmentError> {
        if counts.len() != self.labels.len() {
            return Err(CompartmentError::LengthMismatch {
                labels: self.labels.len(),
                counts: counts.len(),
            });
        }
        self.counts = counts;
        Ok(())
    }

    /// Set a single bucket count
    ///
    /// # Errors
    ///
    /// Returns `CompartmentError::UnknownIndex` if `index` is out of range.
    pub fn set(&mut self, index: usize, count: u64) -> Result<(), CompartmentError> {
        match self.counts.get_mut(index) {
            Some(slot) => {
                *slot = count;
                Ok(())
            }
            None => Err(CompartmentError::UnknownIndex(index)),
        }
    }
}
