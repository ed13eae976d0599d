//! Drift detection — determinism verification and state comparison.

use std::collections::BTreeSet;

use tracing::warn;

use negotiation_engine::domain::{AdaptiveConfig, WeightSet};
use negotiation_engine::engine::WeightState;

use crate::error::{Result, RuntimeError};
use crate::replay;
use crate::session::NegotiationSession;

/// Replay the session's weight events and offer history from scratch and
/// check both hashes against the live session. Only the offers seen by the
/// last round change are replayed; later ones are not yet reflected live.
pub fn verify_session(session: &NegotiationSession) -> Result<()> {
    let (_, weight_hash) = replay::rebuild_weights(
        session.initial_definitions(),
        session.default_table(),
        session.weight_events(),
    )?;
    check_equal(session.weight_hash(), weight_hash)?;

    let (_, adaptive_hash) = replay::rebuild_adaptive(
        session.base_config(),
        session.recomputed_offers(),
        session.round(),
        session.constants(),
    );
    check_equal(session.adaptive_hash(), adaptive_hash)
}

/// Replay the same session inputs twice and require identical hashes.
pub fn verify_determinism(session: &NegotiationSession) -> Result<()> {
    let first = replay::rebuild_weights(
        session.initial_definitions(),
        session.default_table(),
        session.weight_events(),
    )?;
    let second = replay::rebuild_weights(
        session.initial_definitions(),
        session.default_table(),
        session.weight_events(),
    )?;
    check_equal(first.1, second.1)?;

    let (_, a) = replay::rebuild_adaptive(session.base_config(), session.recomputed_offers(), session.round(), session.constants());
    let (_, b) = replay::rebuild_adaptive(session.base_config(), session.recomputed_offers(), session.round(), session.constants());
    check_equal(a, b)
}

fn check_equal(first: String, second: String) -> Result<()> {
    if first == second {
        Ok(())
    } else {
        warn!(first = first.as_str(), second = second.as_str(), "hash drift detected");
        Err(RuntimeError::Determinism { first, second })
    }
}

/// One parameter's weight on both sides of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightDelta {
    pub parameter_id: String,
    pub weight_a: u32,
    pub weight_b: u32,
    pub delta: i64,
}

/// Structured weight comparison — all numeric fields are integers.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightDriftReport {
    pub total_a: u32,
    pub total_b: u32,
    pub total_delta: i64,
    pub added_parameters: Vec<String>,
    pub removed_parameters: Vec<String>,
    /// Parameters present on both sides whose weight changed, in `a` order.
    pub changed: Vec<WeightDelta>,
    pub locked: Vec<String>,
    pub unlocked: Vec<String>,
}

impl WeightDriftReport {
    pub fn is_empty(&self) -> bool {
        self.added_parameters.is_empty()
            && self.removed_parameters.is_empty()
            && self.changed.is_empty()
            && self.locked.is_empty()
            && self.unlocked.is_empty()
    }
}

pub fn compare_weight_states(a: &WeightState, b: &WeightState) -> WeightDriftReport {
    let mut report = compare_weight_sets(&a.weight_set, &b.weight_set);

    let locks_a: BTreeSet<&str> = a.lock_set.iter().collect();
    let locks_b: BTreeSet<&str> = b.lock_set.iter().collect();
    report.locked = locks_b.difference(&locks_a).map(|s| s.to_string()).collect();
    report.unlocked = locks_a.difference(&locks_b).map(|s| s.to_string()).collect();
    report
}

pub fn compare_weight_sets(a: &WeightSet, b: &WeightSet) -> WeightDriftReport {
    let ids_a: BTreeSet<&str> = a.ids().collect();
    let ids_b: BTreeSet<&str> = b.ids().collect();

    let added_parameters = ids_b.difference(&ids_a).map(|s| s.to_string()).collect();
    let removed_parameters = ids_a.difference(&ids_b).map(|s| s.to_string()).collect();

    let changed = a
        .weights()
        .iter()
        .filter_map(|wa| {
            let weight_b = b.weight_of(&wa.parameter_id)?;
            (weight_b != wa.weight).then(|| WeightDelta {
                parameter_id: wa.parameter_id.clone(),
                weight_a: wa.weight,
                weight_b,
                delta: weight_b as i64 - wa.weight as i64,
            })
        })
        .collect();

    WeightDriftReport {
        total_a: a.total_weight(),
        total_b: b.total_weight(),
        total_delta: b.total_weight() as i64 - a.total_weight() as i64,
        added_parameters,
        removed_parameters,
        changed,
        locked: Vec::new(),
        unlocked: Vec::new(),
    }
}

/// How far the adaptive configuration moved between two rounds.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveDriftReport {
    pub anchor_delta: f64,
    pub target_delta: f64,
    pub accept_threshold_delta: f64,
    pub walkaway_threshold_delta: f64,
    /// Payment-term labels whose utility changed.
    pub boosted_terms: Vec<String>,
}

pub fn compare_adaptive(a: &AdaptiveConfig, b: &AdaptiveConfig) -> AdaptiveDriftReport {
    let boosted_terms = b
        .payment_terms
        .utility
        .iter()
        .filter(|(label, value)| a.payment_terms.utility.get(*label) != Some(*value))
        .map(|(label, _)| label.clone())
        .collect();

    AdaptiveDriftReport {
        anchor_delta: b.price.anchor - a.price.anchor,
        target_delta: b.price.target - a.price.target,
        accept_threshold_delta: b.accept_threshold - a.accept_threshold,
        walkaway_threshold_delta: b.walkaway_threshold - a.walkaway_threshold,
        boosted_terms,
    }
}
