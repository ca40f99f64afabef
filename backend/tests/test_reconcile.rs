//! Reconciler tests: conservation, remainder ordering, clamping
//!
//! The reconciler is the part of the core that protects the
//! conservation invariant, so it gets both crafted-vector tests and a
//! property test over random raw vectors.

use multilevel_simulator_core_rs::reconcile::{
    apply, apply_transfer, greedy_largest_bucket, largest_remainder, ReconcileError,
    ReconcilePolicy,
};
use multilevel_simulator_core_rs::CompartmentVector;
use proptest::prelude::*;

#[test]
fn test_largest_remainder_known_ordering() {
    // 2.7 has the largest remainder; the tie between the two 2.4s
    // breaks toward the lower index
    assert_eq!(largest_remainder(&[2.7, 2.4, 2.4], 8).unwrap(), vec![3, 3, 2]);
    assert_eq!(largest_remainder(&[2.4, 2.7, 2.4], 8).unwrap(), vec![3, 3, 2]);
    assert_eq!(largest_remainder(&[2.4, 2.4, 2.7], 8).unwrap(), vec![3, 2, 3]);
}

#[test]
fn test_largest_remainder_differs_only_by_increments() {
    let raw: [f64; 4] = [12.9, 0.1, 33.5, 7.0];
    let floor: Vec<u64> = raw.iter().map(|v| v.trunc() as u64).collect();
    let result = largest_remainder(&raw, 55).unwrap();

    assert_eq!(result.iter().sum::<u64>(), 55);
    let mut increments = 0;
    for (r, f) in result.iter().zip(&floor) {
        assert!(r - f <= 1, "single pass must only add +1 per bucket");
        increments += r - f;
    }
    assert_eq!(increments, 3); // floor sum 52, target 55
}

#[test]
fn test_largest_remainder_rejects_shrinking_target() {
    let err = largest_remainder(&[10.0, 20.0], 25).unwrap_err();
    assert_eq!(
        err,
        ReconcileError::NegativeLoss {
            target: 25,
            floor_sum: 30
        }
    );
}

#[test]
fn test_greedy_policy_dumps_deficit_on_strict_maximum() {
    // pollutant-style fleet: whole loss goes to the biggest bucket
    assert_eq!(
        greedy_largest_bucket(&[150, 30, 15], 200).unwrap(),
        vec![155, 30, 15]
    );
    // tie: first bucket in iteration order wins
    assert_eq!(
        greedy_largest_bucket(&[80, 80, 30], 195).unwrap(),
        vec![85, 80, 30]
    );
}

#[test]
fn test_policy_selection_via_apply() {
    let raw = [150.9, 30.2, 15.0];
    assert_eq!(
        apply(ReconcilePolicy::GreedyLargestBucket, &raw, 200).unwrap(),
        vec![155, 30, 15]
    );
    let lr = apply(ReconcilePolicy::LargestRemainder, &raw, 200).unwrap();
    assert_eq!(lr.iter().sum::<u64>(), 200);
}

#[test]
fn test_transfer_clamps_and_never_goes_negative() {
    let mut c = CompartmentVector::new(
        vec!["S".to_string(), "E".to_string(), "I".to_string()],
        vec![5, 10, 0],
    )
    .unwrap();

    // proposed 12 from a bucket of 5: clamp to 5, source bottoms at 0
    let applied = apply_transfer(&mut c, 0, 1, 12).unwrap();
    assert_eq!(applied, 5);
    assert_eq!(c.counts(), &[0, 15, 0]);
    assert_eq!(c.total(), 15);

    // source already empty: transfer is a conserved no-op
    let applied = apply_transfer(&mut c, 0, 2, 3).unwrap();
    assert_eq!(applied, 0);
    assert_eq!(c.counts(), &[0, 15, 0]);
}

#[test]
fn test_transfer_overflow_is_unreachable_via_public_path() {
    // the clamp in apply_transfer makes ReconcileError::Overflow
    // unreachable; exercise the guard by checking clamping holds even
    // for extreme requests
    let mut c = CompartmentVector::new(
        vec!["S".to_string(), "E".to_string()],
        vec![1, 0],
    )
    .unwrap();
    let applied = apply_transfer(&mut c, 0, 1, u64::MAX).unwrap();
    assert_eq!(applied, 1);
    assert_eq!(c.total(), 1);
}

proptest! {
    /// Conservation: for any non-negative raw vector and any target at
    /// or above the floor sum, the output sums exactly to the target.
    #[test]
    fn prop_largest_remainder_conserves(
        raw in prop::collection::vec(0.0f64..5000.0, 1..8),
        extra in 0u64..50,
    ) {
        let floor_sum: u64 = raw.iter().map(|v| v.trunc() as u64).sum();
        let target = floor_sum + extra;
        let result = largest_remainder(&raw, target).unwrap();

        prop_assert_eq!(result.iter().sum::<u64>(), target);
        for (r, v) in result.iter().zip(&raw) {
            prop_assert!(*r >= v.trunc() as u64, "reconciler must never remove units");
        }
    }

    /// When the deficit fits in one pass, every bucket moves by at most +1.
    #[test]
    fn prop_single_pass_increments_are_unit(
        raw in prop::collection::vec(0.0f64..5000.0, 2..8),
    ) {
        let floor: Vec<u64> = raw.iter().map(|v| v.trunc() as u64).collect();
        let floor_sum: u64 = floor.iter().sum();
        let target = floor_sum + (raw.len() as u64 - 1);
        let result = largest_remainder(&raw, target).unwrap();

        for (r, f) in result.iter().zip(&floor) {
            prop_assert!(r - f <= 1);
        }
    }

    /// Greedy policy conserves too, and touches exactly one bucket.
    #[test]
    fn prop_greedy_conserves(
        counts in prop::collection::vec(0u64..10_000, 1..8),
        extra in 0u64..100,
    ) {
        let sum: u64 = counts.iter().sum();
        let target = sum + extra;
        let result = greedy_largest_bucket(&counts, target).unwrap();

        prop_assert_eq!(result.iter().sum::<u64>(), target);
        let changed = result
            .iter()
            .zip(&counts)
            .filter(|(r, c)| r != c)
            .count();
        prop_assert!(changed <= 1);
    }
}
