//! Negotiation Engine — Scenario Harness
//!
//! Loads a scenario fixture, runs it twice, prints the weight state and
//! the per-round adaptive configuration, and fails on any determinism
//! mismatch.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use negotiation_engine::scenario::{self, Scenario};

const FIXTURE_PATHS: [&str; 3] = [
    "scenario.json",
    "tests/fixtures/scenario.json",
    "negotiation_engine/tests/fixtures/scenario.json",
];

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = match std::env::args().nth(1) {
        Some(p) => p,
        None => match FIXTURE_PATHS.iter().find(|p| Path::new(p).exists()) {
            Some(p) => p.to_string(),
            None => {
                error!("no scenario given and no scenario.json found");
                return ExitCode::FAILURE;
            }
        },
    };

    let data = match fs::read_to_string(&path) {
        Ok(d) => d,
        Err(e) => {
            error!(path = path.as_str(), error = %e, "failed to read scenario");
            return ExitCode::FAILURE;
        }
    };
    let scenario = match Scenario::from_json_str(&data) {
        Ok(s) => s,
        Err(e) => {
            error!(path = path.as_str(), error = %e, "failed to parse scenario");
            return ExitCode::FAILURE;
        }
    };
    info!(path = path.as_str(), "loaded scenario");

    // Run 1
    let first = match scenario::run(&scenario) {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "scenario rejected");
            return ExitCode::FAILURE;
        }
    };
    // Run 2 (determinism check)
    let second = match scenario::run(&scenario) {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "scenario rejected on second run");
            return ExitCode::FAILURE;
        }
    };

    println!("Weights (hash={}):", first.weight_hash);
    for w in first.weight_state.weight_set.weights() {
        let lock = if first.weight_state.lock_set.contains(&w.parameter_id) {
            " [locked]"
        } else {
            ""
        };
        println!("  {:<28} {:>3}%{}", w.parameter_id, w.weight, lock);
    }
    let set = &first.weight_state.weight_set;
    if set.is_balanced() {
        println!("  total {}%", set.total_weight());
    } else {
        println!("  total {}% (need {}%)", set.total_weight(), set.shortfall());
    }

    println!();
    for r in &first.rounds {
        let signal = match (r.utility, r.recommendation) {
            (Some(u), Some(rec)) => format!(
                "{:>3}% -> {}",
                negotiation_engine::recommendation::utility_percent(u),
                rec.label()
            ),
            _ => "-".to_string(),
        };
        println!(
            "round {:>2}: anchor={:.2} target={:.2} accept={:.3} walkaway={:.3}  {}",
            r.round,
            r.adaptive.price.anchor,
            r.adaptive.price.target,
            r.adaptive.accept_threshold,
            r.adaptive.walkaway_threshold,
            signal
        );
    }

    println!("\n===========================================");
    if first == second {
        println!("[OK] Two runs produced identical weight and adaptive hashes.");
        ExitCode::SUCCESS
    } else {
        println!("[FAIL] Determinism failure: two runs differ.");
        ExitCode::FAILURE
    }
}
