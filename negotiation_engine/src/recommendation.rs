//! Negotiation Engine — Recommendation Signal
//!
//! Display-only: scores an incoming offer against the current adaptive
//! configuration. The binding accept/counter decision is made elsewhere.

use serde::{Deserialize, Serialize};

use crate::defaults::{MAX_ACCEPTABLE_PRICE, PAYMENT_TERMS_RANGE, TARGET_UNIT_PRICE};
use crate::domain::{payment_terms_label, AdaptiveConfig, OfferRecord, WeightSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Accept,
    Counter,
    WalkAway,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Accept => "Accept",
            Recommendation::Counter => "Counter",
            Recommendation::WalkAway => "Walk away",
        }
    }
}

/// Relative importance of the price and payment-term dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtilityWeights {
    pub price: f64,
    pub terms: f64,
}

impl Default for UtilityWeights {
    fn default() -> Self {
        Self {
            price: 1.0,
            terms: 0.0,
        }
    }
}

impl UtilityWeights {
    /// Price weight is target + max-acceptable; terms weight is the
    /// payment-terms parameter. Missing parameters count as 0.
    pub fn from_weight_set(weights: &WeightSet) -> Self {
        let w = |id: &str| weights.weight_of(id).unwrap_or(0) as f64;
        Self {
            price: w(TARGET_UNIT_PRICE) + w(MAX_ACCEPTABLE_PRICE),
            terms: w(PAYMENT_TERMS_RANGE),
        }
    }
}

/// 1.0 at or below target, 0.0 at or above the ceiling, linear between.
pub fn price_utility(unit_price: f64, config: &AdaptiveConfig) -> f64 {
    let target = config.price.target;
    let ceiling = config.price.max_acceptable;
    if unit_price <= target {
        1.0
    } else if unit_price >= ceiling {
        0.0
    } else {
        (ceiling - unit_price) / (ceiling - target)
    }
}

pub fn terms_utility(days: u32, config: &AdaptiveConfig) -> Option<f64> {
    config
        .payment_terms
        .utility
        .get(&payment_terms_label(days))
        .copied()
}

/// Weighted mean over the dimensions the offer actually carries.
/// `None` when it carries nothing scoreable.
pub fn offer_utility(
    offer: &OfferRecord,
    config: &AdaptiveConfig,
    weights: &UtilityWeights,
) -> Option<f64> {
    let mut scored = 0.0;
    let mut total = 0.0;

    if let Some(price) = offer.unit_price {
        scored += weights.price * price_utility(price, config);
        total += weights.price;
    }
    if let Some(utility) = offer.payment_terms_days.and_then(|d| terms_utility(d, config)) {
        scored += weights.terms * utility;
        total += weights.terms;
    }

    (total > 0.0).then(|| scored / total)
}

pub fn recommend(utility: f64, config: &AdaptiveConfig) -> Recommendation {
    if utility >= config.accept_threshold {
        Recommendation::Accept
    } else if utility < config.walkaway_threshold {
        Recommendation::WalkAway
    } else {
        Recommendation::Counter
    }
}

/// Utility as a rounded 0–100 percentage for the threshold bars.
pub fn utility_percent(utility: f64) -> u32 {
    (utility.clamp(0.0, 1.0) * 100.0).round() as u32
}
