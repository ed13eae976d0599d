//! Golden scenario test — replays the fixture negotiation and checks
//! the weight state and every round's adaptive configuration.

use std::fs;

use negotiation_engine::defaults::*;
use negotiation_engine::recommendation::Recommendation;
use negotiation_engine::scenario::{self, Scenario, ScenarioReport};
use negotiation_engine::ENGINE_VERSION;

const EPS: f64 = 1e-9;

fn load_scenario() -> Scenario {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/scenario.json");
    let data = fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path, e));
    Scenario::from_json_str(&data).expect("Failed to parse scenario JSON")
}

fn run() -> ScenarioReport {
    scenario::run(&load_scenario()).expect("scenario rejected")
}

fn assert_close(actual: f64, expected: f64, what: &str) {
    assert!(
        (actual - expected).abs() < EPS,
        "{}: got {}, expected {}",
        what,
        actual,
        expected
    );
}

#[test]
fn golden_weights_after_edits() {
    let report = run();
    let weights: Vec<u32> = report
        .weight_state
        .weight_set
        .weights()
        .iter()
        .map(|w| w.weight)
        .collect();
    assert_eq!(weights, vec![50, 10, 8, 3, 20, 6, 3]);
    assert_eq!(report.weights.len(), 7);
    assert_eq!(report.weights[TARGET_UNIT_PRICE], 50);
    assert_eq!(report.weights[DELIVERY_DATE], 20);
    assert_eq!(report.weights.values().sum::<u32>(), 100);
    assert!(report.weight_state.weight_set.is_balanced());

    let locks: Vec<&str> = report.weight_state.lock_set.iter().collect();
    assert_eq!(locks, vec![DELIVERY_DATE, TARGET_UNIT_PRICE, VOLUME_DISCOUNT_EXPECTATION]);
    assert!(!report.weight_state.weight_set.contains("siteAuditDate"));
    assert!(report.outcomes.iter().all(|o| o.changed && !o.contention));
}

#[test]
fn golden_rounds() {
    let report = run();
    assert_eq!(report.rounds.len(), 5);

    let anchors = [81.2, 82.4, 83.6, 84.8, 86.0];
    let targets = [100.0, 100.0, 102.9, 99.75, 99.75];
    let accepts = [0.67, 0.64, 0.61, 0.58, 0.55];
    let walkaways = [0.28, 0.26, 0.24, 0.22, 0.2];
    for (i, r) in report.rounds.iter().enumerate() {
        assert_eq!(r.round, i as u32 + 1);
        assert_close(r.adaptive.price.anchor, anchors[i], "anchor");
        assert_close(r.adaptive.price.target, targets[i], "target");
        assert_close(r.adaptive.accept_threshold, accepts[i], "accept");
        assert_close(r.adaptive.walkaway_threshold, walkaways[i], "walkaway");
        assert_close(r.adaptive.payment_terms.utility["Net 30"], 0.66, "Net 30 utility");
        assert_eq!(r.adaptive.price.max_acceptable, 130.0);
    }
}

#[test]
fn golden_recommendations() {
    let report = run();
    let recs: Vec<Option<Recommendation>> = report.rounds.iter().map(|r| r.recommendation).collect();
    assert_eq!(
        recs,
        vec![
            Some(Recommendation::Counter),
            Some(Recommendation::Accept),
            Some(Recommendation::Accept),
            Some(Recommendation::Accept),
            None,
        ]
    );
    assert_close(report.rounds[0].utility.unwrap(), 21.98 / 63.0, "round 1 utility");
}

#[test]
fn golden_run_is_deterministic() {
    let first = run();
    let second = run();
    assert_eq!(first.weight_hash, second.weight_hash);
    for (a, b) in first.rounds.iter().zip(&second.rounds) {
        assert_eq!(a.adaptive_hash, b.adaptive_hash, "round {} hash drifted", a.round);
    }
    assert_eq!(first, second);
}

#[test]
fn engine_version_is_one() {
    assert_eq!(ENGINE_VERSION, 1, "ENGINE_VERSION must be 1 and never change");
}
