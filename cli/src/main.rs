//! Demo driver for the coupling core
//!
//! Runs the canonical epidemic scenario (discrete contact process +
//! continuous E -> I -> R flows) and writes the per-round results file.

use std::fs::File;
use std::process::ExitCode;

use multilevel_simulator_core_rs::{
    Director, DirectorConfig, FlowRate, SubModelConfig,
};

const RESULT_FILE: &str = "res.txt";

fn demo_config() -> DirectorConfig {
    DirectorConfig {
        population_size: 1000,
        compartment_labels: vec![
            "S".to_string(),
            "E".to_string(),
            "I".to_string(),
            "R".to_string(),
        ],
        initial_counts: vec![990, 10, 0, 0],
        max_rounds: 20,
        stop_when_exhausted: Some(vec![1, 2]),
        rng_seed: 12345,
        submodel_configs: vec![
            SubModelConfig::Contact {
                name: "mobility".to_string(),
                susceptible: 0,
                exposed: 1,
                infectious: vec![1, 2],
                transmission_rate: 0.8,
            },
            SubModelConfig::LinearFlow {
                name: "eir".to_string(),
                coverage: vec![1, 2, 3],
                flows: vec![
                    FlowRate {
                        source: 1,
                        destination: 2,
                        rate: 1.0,
                    },
                    FlowRate {
                        source: 2,
                        destination: 3,
                        rate: 0.1,
                    },
                ],
                duration: 0.15,
                steps: 1000,
                gate: None,
                policy: None,
            },
        ],
    }
}

fn main() -> ExitCode {
    let mut director = match Director::new(demo_config()) {
        Ok(director) => director,
        Err(e) => {
            eprintln!("setup failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let rounds = match director.run() {
        Ok(rounds) => rounds,
        Err(e) => {
            eprintln!("simulation failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    for line in director.results_lines() {
        println!("{line}");
    }

    let mut file = match File::create(RESULT_FILE) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("cannot create {RESULT_FILE}: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = director.round_log().write_to(&mut file) {
        eprintln!("cannot write {RESULT_FILE}: {e}");
        return ExitCode::FAILURE;
    }

    println!(
        "completed {rounds} rounds, final total {} (conserved)",
        director.compartments().total()
    );
    ExitCode::SUCCESS
}
