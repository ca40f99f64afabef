//! Compartment vector and results-line tests

use multilevel_simulator_core_rs::{CompartmentError, CompartmentVector, RoundLog};

#[test]
fn test_labelled_access_and_total() {
    let c = CompartmentVector::new(
        vec!["Petroil".to_string(), "LPG".to_string(), "Electric".to_string()],
        vec![200, 0, 0],
    )
    .unwrap();

    assert_eq!(c.total(), 200);
    assert_eq!(c.get_by_label("Petroil"), Some(200));
    assert_eq!(c.get_by_label("Electric"), Some(0));
    assert_eq!(c.get_by_label("Diesel"), None);
}

#[test]
fn test_construction_validation() {
    assert!(matches!(
        CompartmentVector::new(vec![], vec![]),
        Err(CompartmentError::Empty)
    ));
    assert!(matches!(
        CompartmentVector::new(vec!["A".to_string()], vec![1, 2]),
        Err(CompartmentError::LengthMismatch { .. })
    ));
    assert!(matches!(
        CompartmentVector::new(vec!["A".to_string(), "A".to_string()], vec![1, 2]),
        Err(CompartmentError::DuplicateLabel(_))
    ));
}

#[test]
fn test_results_line_shape_is_stable() {
    // external reporting tooling parses this exact shape; it must not
    // change with reconciliation policy or domain
    let mut log = RoundLog::new(vec![
        "S".to_string(),
        "E".to_string(),
        "I".to_string(),
        "R".to_string(),
    ]);
    log.record(0, vec![975, 25, 0, 0]);
    assert_eq!(log.lines()[0], "at step 1 S = 975; E = 25; I = 0; R = 0");

    let mut fleet = RoundLog::new(vec![
        "Petroil".to_string(),
        "LPG".to_string(),
        "Electric".to_string(),
    ]);
    fleet.record(4, vec![120, 50, 30]);
    assert_eq!(fleet.lines()[0], "at step 5 Petroil = 120; LPG = 50; Electric = 30");
}

#[test]
fn test_round_log_append_only_ordering() {
    let mut log = RoundLog::new(vec!["Prey".to_string(), "Predator".to_string()]);
    for round in 0..5 {
        log.record(round, vec![50 + round, 50 - round]);
    }
    let rounds: Vec<u64> = log.records().iter().map(|r| r.round).collect();
    assert_eq!(rounds, vec![0, 1, 2, 3, 4]);
}
