//! Negotiation Engine — Adaptive Configuration
//!
//! Derives the round-specific configuration from the base configuration
//! and the offer history. Stateless: same inputs, same output, and the
//! base configuration is never touched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{AdaptiveConfig, NegotiationConfig, OfferRecord};

/// Tuning for per-round recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdaptiveConstants {
    /// Share of the anchor→target gap closed at full convergence.
    pub anchor_drift: f64,
    /// Target sits this factor above the best counterparty price.
    pub target_premium: f64,
    pub accept_decay: f64,
    pub accept_floor: f64,
    pub walkaway_decay: f64,
    pub walkaway_floor: f64,
    /// A payment term must exceed this share of counterparty offers.
    pub term_dominance_ratio: f64,
    pub term_utility_boost: f64,
}

impl Default for AdaptiveConstants {
    fn default() -> Self {
        Self {
            anchor_drift: 0.3,
            target_premium: 1.05,
            accept_decay: 0.15,
            accept_floor: 0.5,
            walkaway_decay: 0.10,
            walkaway_floor: 0.2,
            term_dominance_ratio: 0.6,
            term_utility_boost: 1.1,
        }
    }
}

/// Recompute with the default constants.
pub fn recompute(
    base: &NegotiationConfig,
    history: &[OfferRecord],
    round: u32,
    max_rounds: u32,
) -> AdaptiveConfig {
    recompute_with(base, history, round, max_rounds, &AdaptiveConstants::default())
}

pub fn recompute_with(
    base: &NegotiationConfig,
    history: &[OfferRecord],
    round: u32,
    max_rounds: u32,
    constants: &AdaptiveConstants,
) -> AdaptiveConfig {
    let mut adaptive = AdaptiveConfig::from(base);

    let Some(best_price) = best_counterparty_price(history) else {
        return adaptive;
    };
    let has_own_price = history
        .iter()
        .any(|o| !o.is_counterparty() && o.unit_price.is_some());
    if !has_own_price {
        return adaptive;
    }

    let progress = convergence(round, max_rounds);
    let price = &base.price;

    adaptive.price.anchor =
        price.anchor + (price.target - price.anchor) * progress * constants.anchor_drift;

    if best_price < price.target {
        adaptive.price.target = best_price * constants.target_premium;
    }

    adaptive.accept_threshold = (base.accept_threshold - progress * constants.accept_decay)
        .max(constants.accept_floor);
    adaptive.walkaway_threshold = (base.walkaway_threshold - progress * constants.walkaway_decay)
        .max(constants.walkaway_floor);

    if let Some(label) = dominant_payment_term(history, constants.term_dominance_ratio) {
        if let Some(utility) = adaptive.payment_terms.utility.get_mut(&label) {
            *utility = (*utility * constants.term_utility_boost).min(1.0);
        }
    }

    debug!(
        round,
        max_rounds,
        progress,
        anchor = adaptive.price.anchor,
        target = adaptive.price.target,
        accept = adaptive.accept_threshold,
        walkaway = adaptive.walkaway_threshold,
        "adaptive configuration recomputed"
    );
    adaptive
}

/// Round progress in [0, 1]. A zero round budget counts as fully converged.
pub fn convergence(round: u32, max_rounds: u32) -> f64 {
    if max_rounds == 0 {
        return 1.0;
    }
    (round as f64 / max_rounds as f64).min(1.0)
}

/// Offers made in `round` or earlier, in recorded order.
pub fn history_through(history: &[OfferRecord], round: u32) -> Vec<OfferRecord> {
    history.iter().filter(|o| o.round <= round).cloned().collect()
}

/// Lowest finite unit price the counterparty has offered so far.
pub fn best_counterparty_price(history: &[OfferRecord]) -> Option<f64> {
    history
        .iter()
        .filter(|o| o.is_counterparty())
        .filter_map(|o| o.unit_price)
        .filter(|price| price.is_finite())
        .reduce(f64::min)
}

/// The counterparty payment term accounting for more than `ratio` of
/// their payment-term offers, if any.
pub fn dominant_payment_term(history: &[OfferRecord], ratio: f64) -> Option<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for label in history
        .iter()
        .filter(|o| o.is_counterparty())
        .filter_map(|o| o.payment_terms_label())
    {
        *counts.entry(label).or_insert(0) += 1;
    }

    let total: usize = counts.values().sum();
    if total == 0 {
        return None;
    }
    counts
        .into_iter()
        .find(|(_, count)| *count as f64 / total as f64 > ratio)
        .map(|(label, _)| label)
}
