//! Conservation reconciliation
//!
//! Converts raw sub-model output (real-valued compartment estimates, or
//! an integer transfer between two buckets) into an integer compartment
//! vector that sums exactly to a target total. This is where the
//! conservation invariant is enforced: no individual is ever lost to
//! truncation and none is ever duplicated.
//!
//! # Policies
//!
//! - **Largest-remainder apportionment** (default): the discrete
//!   analogue of the largest-remainder seat-apportionment method.
//!   Minimizes total rounding error versus any fixed-bucket dumping
//!   policy and treats all buckets symmetrically when remainders tie.
//! - **Greedy-largest-bucket** (alternate): the entire deficit goes to
//!   the strict-maximum bucket. Used when the raw values are already
//!   integers and only a pre-computed loss must be added back.
//!
//! A negative deficit is always an error: the reconciler only ever adds
//! back lost units. Needing to remove units indicates a modeling bug
//! upstream and silently dropping population would violate the exact
//! invariant this module exists to protect.

use crate::models::CompartmentVector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Remainder-distribution policy, selected per sub-model at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcilePolicy {
    /// Truncate, then distribute the deficit to the buckets with the
    /// largest fractional remainders (lowest index wins ties)
    LargestRemainder,

    /// Truncate, then add the entire deficit to the first bucket
    /// holding the strict maximum value
    GreedyLargestBucket,
}

/// Errors raised while reconciling sub-model output
#[derive(Debug, Error, PartialEq)]
pub enum ReconcileError {
    /// The truncated values already exceed the target: honoring the
    /// target would require removing units from the conserved total
    #[error("reconciliation target {target} is below floor sum {floor_sum}; removing units would break conservation")]
    NegativeLoss { target: u64, floor_sum: u64 },

    /// Raw result length does not match the number of covered buckets
    #[error("raw result has {got} values, expected {expected}")]
    LengthMismatch { expected: usize, got: usize },

    /// A transfer endpoint does not exist in the compartment vector
    #[error("transfer references unknown bucket index {0}")]
    UnknownBucket(usize),

    /// A transfer's source and destination are the same bucket
    #[error("transfer source and destination are both bucket {0}")]
    SelfTransfer(usize),

    /// Defensive check: a clamped transfer still exceeds its source.
    /// Unreachable given the clamping in [`apply_transfer`], kept as a
    /// guard against future edits.
    #[error("transfer of {applied} from bucket {source_bucket} exceeds available {available}")]
    Overflow {
        source_bucket: usize,
        applied: u64,
        available: u64,
    },
}

/// Largest-remainder apportionment
///
/// Maps `raw` (arbitrary non-negative reals; negatives are clamped to
/// zero) to an integer vector summing exactly to `target`:
///
/// 1. Truncate each value toward zero; record its fractional remainder.
/// 2. `deficit = target - floor_sum` (negative is [`ReconcileError::NegativeLoss`]).
/// 3. `deficit` times: increment the bucket with the largest remaining
///    remainder (lowest index on ties) and consume that remainder. If
///    every remainder is consumed and deficit remains, selection wraps
///    and continues in original bucket order.
///
/// # Example
/// ```
/// use multilevel_simulator_core_rs::reconcile::largest_remainder;
///
/// // 2.7 rounds up first, then the first 2.4 wins the tie
/// let result = largest_remainder(&[2.7, 2.4, 2.4], 8).unwrap();
/// assert_eq!(result, vec![3, 3, 2]);
/// assert_eq!(result.iter().sum::<u64>(), 8);
/// ```
pub fn largest_remainder(raw: &[f64], target: u64) -> Result<Vec<u64>, ReconcileError> {
    let mut result = Vec::with_capacity(raw.len());
    let mut remainders = Vec::with_capacity(raw.len());
    for &value in raw {
        // solvers can undershoot zero by numerical noise; a negative
        // count is meaningless, so floor the input at zero
        let value = value.max(0.0);
        result.push(value.trunc() as u64);
        remainders.push(value.fract());
    }

    let floor_sum: u64 = result.iter().sum();
    if floor_sum > target {
        return Err(ReconcileError::NegativeLoss { target, floor_sum });
    }

    let mut deficit = target - floor_sum;
    while deficit > 0 {
        let mut best: Option<usize> = None;
        for (i, &r) in remainders.iter().enumerate() {
            if r < 0.0 {
                continue; // consumed this pass
            }
            match best {
                Some(b) if remainders[b] >= r => {}
                _ => best = Some(i),
            }
        }
        match best {
            Some(i) => {
                result[i] += 1;
                remainders[i] = -1.0;
                deficit -= 1;
            }
            None => {
                // all remainders consumed: wrap and re-allow selection
                // in original bucket order
                for r in remainders.iter_mut() {
                    *r = 0.0;
                }
            }
        }
    }

    Ok(result)
}

/// Greedy-largest-bucket loss correction
///
/// `counts` is already integer; the deficit `target - sum(counts)` is
/// added wholesale to the first bucket holding the strict maximum
/// value. A negative deficit is [`ReconcileError::NegativeLoss`].
pub fn greedy_largest_bucket(counts: &[u64], target: u64) -> Result<Vec<u64>, ReconcileError> {
    let sum: u64 = counts.iter().sum();
    if sum > target {
        return Err(ReconcileError::NegativeLoss {
            target,
            floor_sum: sum,
        });
    }

    let mut result = counts.to_vec();
    let deficit = target - sum;
    if deficit > 0 {
        let mut biggest = 0usize;
        for (i, &count) in result.iter().enumerate() {
            if count > result[biggest] {
                biggest = i;
            }
        }
        result[biggest] += deficit;
    }

    Ok(result)
}

/// Apply the selected policy to a raw continuous result
///
/// For [`ReconcilePolicy::GreedyLargestBucket`] the values are truncated
/// toward zero first (the policy is meant for output that is already
/// integral up to numerical noise).
pub fn apply(policy: ReconcilePolicy, raw: &[f64], target: u64) -> Result<Vec<u64>, ReconcileError> {
    match policy {
        ReconcilePolicy::LargestRemainder => largest_remainder(raw, target),
        ReconcilePolicy::GreedyLargestBucket => {
            let truncated: Vec<u64> = raw.iter().map(|v| v.max(0.0).trunc() as u64).collect();
            greedy_largest_bucket(&truncated, target)
        }
    }
}

/// Apply a discrete transfer between two buckets, clamping to the source
///
/// A sub-model cannot move more individuals than exist in the source
/// bucket: `requested` is clamped to the source count, then the source
/// is decremented and the destination incremented atomically. Returns
/// the applied (clamped) count.
///
/// # Example
/// ```
/// use multilevel_simulator_core_rs::{CompartmentVector, reconcile::apply_transfer};
///
/// let mut c = CompartmentVector::new(
///     vec!["S".to_string(), "E".to_string()],
///     vec![5, 0],
/// ).unwrap();
///
/// let applied = apply_transfer(&mut c, 0, 1, 12).unwrap();
/// assert_eq!(applied, 5);
/// assert_eq!(c.counts(), &[0, 5]);
/// ```
pub fn apply_transfer(
    compartments: &mut CompartmentVector,
    source: usize,
    destination: usize,
    requested: u64,
) -> Result<u64, ReconcileError> {
    if source == destination {
        return Err(ReconcileError::SelfTransfer(source));
    }
    let available = compartments
        .get(source)
        .ok_or(ReconcileError::UnknownBucket(source))?;
    let destination_count = compartments
        .get(destination)
        .ok_or(ReconcileError::UnknownBucket(destination))?;

    let applied = requested.min(available);
    if applied > available {
        return Err(ReconcileError::Overflow {
            source_bucket: source,
            applied,
            available,
        });
    }

    // infallible: both indices validated above
    let _ = compartments.set(source, available - applied);
    let _ = compartments.set(destination, destination_count + applied);
    Ok(applied)
}
