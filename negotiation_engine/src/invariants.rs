//! Negotiation Engine — Invariant Checks
//!
//! Non-panicking validation for caller-facing seams. Every check
//! returns the first violation found. The pure weight and adaptive
//! functions never call these.

use std::collections::BTreeSet;

use crate::arithmetic::{is_valid_parameter_id, sum_weights, MAX_WEIGHT};
use crate::domain::{LockSet, NegotiationConfig, WeightSet};
use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Ids well-formed and unique, weights in range, cached total honest.
pub fn try_validate_weight_set(weight_set: &WeightSet) -> Result<(), EngineError> {
    check_parameter_ids(weight_set)?;
    check_weight_range(weight_set)?;
    check_cached_total(weight_set)?;
    Ok(())
}

/// Every lock must name a parameter in the set.
pub fn try_validate_lock_set(lock_set: &LockSet, weight_set: &WeightSet) -> Result<(), EngineError> {
    match lock_set.iter().find(|id| !weight_set.contains(id)) {
        Some(id) => Err(EngineError::UnknownLock(id.to_string())),
        None => Ok(()),
    }
}

/// Thresholds and utilities in [0, 1], walk-away at or below accept,
/// target at or below the ceiling, at least one round.
pub fn try_validate_config(config: &NegotiationConfig) -> Result<(), EngineError> {
    check_unit_interval("accept_threshold", config.accept_threshold)?;
    check_unit_interval("walkaway_threshold", config.walkaway_threshold)?;
    if config.walkaway_threshold > config.accept_threshold {
        return Err(EngineError::InvertedThresholds {
            accept: config.accept_threshold,
            walkaway: config.walkaway_threshold,
        });
    }

    for (label, value) in &config.payment_terms.utility {
        if !(0.0..=1.0).contains(value) {
            return Err(EngineError::InvalidUtility {
                label: label.clone(),
                value: *value,
            });
        }
    }

    if config.price.target > config.price.max_acceptable {
        return Err(EngineError::InvalidPriceBand {
            target: config.price.target,
            max_acceptable: config.price.max_acceptable,
        });
    }

    if config.max_rounds == 0 {
        return Err(EngineError::InvalidMaxRounds);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Individual checks (private)
// ---------------------------------------------------------------------------

fn check_parameter_ids(weight_set: &WeightSet) -> Result<(), EngineError> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for id in weight_set.ids() {
        if !is_valid_parameter_id(id) {
            return Err(EngineError::InvalidParameterId(id.to_string()));
        }
        if !seen.insert(id) {
            return Err(EngineError::DuplicateParameter(id.to_string()));
        }
    }
    Ok(())
}

fn check_weight_range(weight_set: &WeightSet) -> Result<(), EngineError> {
    match weight_set.weights().iter().find(|w| w.weight > MAX_WEIGHT) {
        Some(w) => Err(EngineError::WeightOutOfRange {
            parameter_id: w.parameter_id.clone(),
            weight: w.weight,
        }),
        None => Ok(()),
    }
}

fn check_cached_total(weight_set: &WeightSet) -> Result<(), EngineError> {
    let actual = sum_weights(weight_set.weights().iter().map(|w| w.weight));
    if actual != weight_set.total_weight() {
        return Err(EngineError::TotalMismatch {
            cached: weight_set.total_weight(),
            actual,
        });
    }
    Ok(())
}

fn check_unit_interval(name: &'static str, value: f64) -> Result<(), EngineError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::InvalidThreshold { name, value })
    }
}
