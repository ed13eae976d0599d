//! Negotiation Engine — Weight Allocation
//!
//! Keeps a set of parameter weights summing to 100 while honoring locks.
//! Every function takes the current state by reference and returns a new
//! one; inputs are never mutated.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::arithmetic::{round_half_up, sum_weights, CUSTOM_RESERVATION, MAX_WEIGHT, WEIGHT_TOTAL};
use crate::domain::{LockSet, ParameterDefinition, ParameterWeight, WeightSet};

/// Weights and locks after a mutating call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEdit {
    pub weight_set: WeightSet,
    pub lock_set: LockSet,
}

impl WeightEdit {
    fn unchanged(weight_set: &WeightSet, lock_set: &LockSet) -> Self {
        Self {
            weight_set: weight_set.clone(),
            lock_set: lock_set.clone(),
        }
    }
}

/// Seed weights from the default table.
///
/// Custom parameters split a 10-point reservation evenly (floored);
/// core ids missing from the table get 0. The total may miss 100.
pub fn initialize(
    definitions: &[ParameterDefinition],
    default_table: &BTreeMap<String, u32>,
) -> WeightSet {
    let custom_count = definitions.iter().filter(|d| d.is_custom()).count() as u32;
    let custom_weight = if custom_count > 0 {
        CUSTOM_RESERVATION / custom_count
    } else {
        0
    };

    let weights = definitions
        .iter()
        .map(|def| {
            let weight = if def.is_custom() {
                custom_weight
            } else {
                default_table.get(&def.id).copied().unwrap_or(0).min(MAX_WEIGHT)
            };
            ParameterWeight::from_definition(def, weight)
        })
        .collect();

    let weight_set = WeightSet::new(weights);
    if !weight_set.is_balanced() {
        debug!(
            total_weight = weight_set.total_weight(),
            custom_count, "initial weights do not sum to 100"
        );
    }
    weight_set
}

/// Set one parameter's weight and push the difference onto the
/// unlocked, non-zero parameters in proportion to their current share.
///
/// The edited parameter becomes locked. When nothing can absorb the
/// difference the total is left off 100 for the caller to display.
pub fn set_weight(
    weight_set: &WeightSet,
    lock_set: &LockSet,
    parameter_id: &str,
    new_weight: u32,
) -> WeightEdit {
    let Some(old_weight) = weight_set.weight_of(parameter_id) else {
        warn!(parameter_id, "set_weight on unknown parameter ignored");
        return WeightEdit::unchanged(weight_set, lock_set);
    };
    if new_weight == old_weight {
        return WeightEdit::unchanged(weight_set, lock_set);
    }

    let mut lock_set = lock_set.clone();
    lock_set.insert(parameter_id);

    let mut weights = weight_set.weights().to_vec();
    let adjustable = adjustable_indices(&weights, &lock_set, parameter_id);

    for w in weights.iter_mut().filter(|w| w.parameter_id == parameter_id) {
        w.weight = new_weight;
    }

    if adjustable.is_empty() {
        let weight_set = WeightSet::new(weights);
        debug!(
            parameter_id,
            old_weight,
            new_weight,
            total_weight = weight_set.total_weight(),
            "no adjustable parameters, total left unbalanced"
        );
        return WeightEdit {
            weight_set,
            lock_set,
        };
    }

    let delta = new_weight as f64 - old_weight as f64;
    let subtotal = adjustable
        .iter()
        .map(|&idx| weights[idx].weight as f64)
        .sum::<f64>();

    for &idx in &adjustable {
        let current = weights[idx].weight as f64;
        let adjustment = delta * (current / subtotal);
        let adjusted = (current - adjustment).clamp(0.0, MAX_WEIGHT as f64);
        weights[idx].weight = round_half_up(adjusted) as u32;
    }

    correct_rounding(&mut weights, &adjustable);

    let weight_set = WeightSet::new(weights);
    debug!(
        parameter_id,
        old_weight,
        new_weight,
        adjustable = adjustable.len(),
        total_weight = weight_set.total_weight(),
        "weights redistributed"
    );
    WeightEdit {
        weight_set,
        lock_set,
    }
}

/// Whether an edit to `parameter_id` has anything to redistribute onto.
pub fn has_adjustable(weight_set: &WeightSet, lock_set: &LockSet, parameter_id: &str) -> bool {
    !adjustable_indices(weight_set.weights(), lock_set, parameter_id).is_empty()
}

/// Other parameters that are unlocked and still carry weight.
fn adjustable_indices(
    weights: &[ParameterWeight],
    lock_set: &LockSet,
    parameter_id: &str,
) -> Vec<usize> {
    weights
        .iter()
        .enumerate()
        .filter(|(_, w)| {
            w.parameter_id != parameter_id && !lock_set.contains(&w.parameter_id) && w.weight > 0
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Push `100 - sum` onto the largest adjustable weight, first one on ties.
/// Never takes a weight below zero.
fn correct_rounding(weights: &mut [ParameterWeight], adjustable: &[usize]) {
    let sum = sum_weights(weights.iter().map(|w| w.weight)) as i64;
    let diff = WEIGHT_TOTAL as i64 - sum;
    if diff == 0 {
        return;
    }

    let mut largest: Option<usize> = None;
    for &idx in adjustable {
        match largest {
            Some(best) if weights[idx].weight <= weights[best].weight => {}
            _ => largest = Some(idx),
        }
    }

    if let Some(idx) = largest {
        let corrected = (weights[idx].weight as i64 + diff).clamp(0, MAX_WEIGHT as i64);
        weights[idx].weight = corrected as u32;
    }
}

/// Lock if unlocked, unlock if locked. Weights are untouched.
pub fn toggle_lock(lock_set: &LockSet, parameter_id: &str) -> LockSet {
    let mut lock_set = lock_set.clone();
    if !lock_set.remove(parameter_id) {
        lock_set.insert(parameter_id);
    }
    lock_set
}

/// Back to defaults with every lock released.
pub fn reset(
    definitions: &[ParameterDefinition],
    default_table: &BTreeMap<String, u32>,
) -> WeightEdit {
    WeightEdit {
        weight_set: initialize(definitions, default_table),
        lock_set: LockSet::new(),
    }
}

/// Drop weights whose parameter no longer exists.
pub fn prune<'a, I>(weight_set: &WeightSet, valid_ids: I) -> WeightSet
where
    I: IntoIterator<Item = &'a str>,
{
    let valid: BTreeSet<&str> = valid_ids.into_iter().collect();
    let kept = weight_set
        .weights()
        .iter()
        .filter(|w| valid.contains(w.parameter_id.as_str()))
        .cloned()
        .collect();
    WeightSet::new(kept)
}

/// Bring weights and locks in line with a changed definition list.
///
/// Prunes first. If the pruned set no longer covers every definition the
/// stale set is discarded and re-initialized with no locks.
pub fn reconcile(
    weight_set: &WeightSet,
    lock_set: &LockSet,
    definitions: &[ParameterDefinition],
    default_table: &BTreeMap<String, u32>,
) -> WeightEdit {
    let pruned = prune(weight_set, definitions.iter().map(|d| d.id.as_str()));
    if pruned.len() != definitions.len() {
        debug!(
            pruned = pruned.len(),
            expected = definitions.len(),
            "parameter set changed, re-initializing weights"
        );
        return reset(definitions, default_table);
    }

    let lock_set = lock_set
        .iter()
        .filter(|id| pruned.contains(id))
        .collect::<LockSet>();
    WeightEdit {
        weight_set: pruned,
        lock_set,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::*;
    use crate::domain::ParameterSource;

    fn defaults() -> WeightSet {
        initialize(&core_parameter_definitions(), &default_weight_table())
    }

    fn weights_of(set: &WeightSet) -> Vec<u32> {
        set.weights().iter().map(|w| w.weight).collect()
    }

    fn def(id: &str, source: ParameterSource) -> ParameterDefinition {
        ParameterDefinition::new(id, id, source)
    }

    #[test]
    fn test_initialize_defaults() {
        let set = defaults();
        assert_eq!(weights_of(&set), vec![35, 20, 10, 5, 15, 10, 5]);
        assert!(set.is_balanced());
    }

    #[test]
    fn test_initialize_splits_custom_reservation() {
        let mut defs = core_parameter_definitions();
        defs.push(def("esg", ParameterSource::Custom));
        defs.push(def("localContent", ParameterSource::Custom));
        defs.push(def("carbon", ParameterSource::Custom));
        let set = initialize(&defs, &default_weight_table());
        assert_eq!(set.weight_of("esg"), Some(3));
        assert_eq!(set.weight_of("carbon"), Some(3));
        assert_eq!(set.total_weight(), 109);
    }

    #[test]
    fn test_initialize_unknown_core_defaults_to_zero() {
        let defs = vec![
            def(TARGET_UNIT_PRICE, ParameterSource::CoreStep2),
            def("incoterms", ParameterSource::CoreStep3),
        ];
        let set = initialize(&defs, &default_weight_table());
        assert_eq!(weights_of(&set), vec![35, 0]);
        assert_eq!(set.shortfall(), 65);
    }

    #[test]
    fn test_raise_target_price_redistributes() {
        let edit = set_weight(&defaults(), &LockSet::new(), TARGET_UNIT_PRICE, 50);
        assert_eq!(weights_of(&edit.weight_set), vec![50, 14, 8, 4, 12, 8, 4]);
        assert_eq!(edit.weight_set.total_weight(), 100);
        assert!(edit.lock_set.contains(TARGET_UNIT_PRICE));
        assert_eq!(edit.lock_set.len(), 1);
    }

    #[test]
    fn test_lower_target_price_redistributes() {
        let edit = set_weight(&defaults(), &LockSet::new(), TARGET_UNIT_PRICE, 20);
        assert_eq!(weights_of(&edit.weight_set), vec![20, 26, 12, 6, 18, 12, 6]);
        assert!(edit.weight_set.is_balanced());
    }

    #[test]
    fn test_locked_parameter_is_untouched() {
        let locks = toggle_lock(&LockSet::new(), VOLUME_DISCOUNT_EXPECTATION);
        let edit = set_weight(&defaults(), &locks, DELIVERY_DATE, 25);
        assert_eq!(edit.weight_set.weight_of(VOLUME_DISCOUNT_EXPECTATION), Some(10));
        assert_eq!(weights_of(&edit.weight_set), vec![31, 17, 10, 4, 25, 9, 4]);
        assert!(edit.weight_set.is_balanced());
        assert!(edit.lock_set.contains(DELIVERY_DATE));
        assert!(edit.lock_set.contains(VOLUME_DISCOUNT_EXPECTATION));
    }

    #[test]
    fn test_successive_edits_keep_earlier_edit_locked() {
        let first = set_weight(&defaults(), &LockSet::new(), TARGET_UNIT_PRICE, 50);
        let second = set_weight(&first.weight_set, &first.lock_set, DELIVERY_DATE, 20);
        assert_eq!(weights_of(&second.weight_set), vec![50, 12, 6, 3, 20, 6, 3]);
        assert!(second.weight_set.is_balanced());
        assert_eq!(second.lock_set.len(), 2);
    }

    #[test]
    fn test_contention_leaves_total_visible() {
        let mut table = default_weight_table();
        table.insert(TARGET_UNIT_PRICE.to_string(), 40);
        table.insert(QUALITY_STANDARDS.to_string(), 0);
        let set = initialize(&core_parameter_definitions(), &table);
        assert!(set.is_balanced());

        let locks: LockSet = [
            MAX_ACCEPTABLE_PRICE,
            VOLUME_DISCOUNT_EXPECTATION,
            PAYMENT_TERMS_RANGE,
            DELIVERY_DATE,
            WARRANTY_PERIOD,
        ]
        .into_iter()
        .collect();

        let edit = set_weight(&set, &locks, TARGET_UNIT_PRICE, 50);
        assert_eq!(edit.weight_set.total_weight(), 110);
        assert_eq!(edit.weight_set.shortfall(), -10);
        assert_eq!(edit.weight_set.weight_of(QUALITY_STANDARDS), Some(0));
        assert!(edit.lock_set.contains(TARGET_UNIT_PRICE));
    }

    #[test]
    fn test_overshoot_never_goes_negative() {
        let locks: LockSet = [MAX_ACCEPTABLE_PRICE, DELIVERY_DATE, WARRANTY_PERIOD]
            .into_iter()
            .collect();
        let edit = set_weight(&defaults(), &locks, TARGET_UNIT_PRICE, 90);
        assert_eq!(weights_of(&edit.weight_set), vec![90, 20, 0, 0, 15, 10, 0]);
        assert_eq!(edit.weight_set.total_weight(), 135);
    }

    #[test]
    fn test_rounding_correction_tie_goes_to_first() {
        let defs = vec![
            def("a", ParameterSource::Custom),
            def("b", ParameterSource::Custom),
            def("c", ParameterSource::Custom),
        ];
        let set = WeightSet::new(vec![
            ParameterWeight::from_definition(&defs[0], 30),
            ParameterWeight::from_definition(&defs[1], 30),
            ParameterWeight::from_definition(&defs[2], 40),
        ]);
        let edit = set_weight(&set, &LockSet::new(), "c", 41);
        assert_eq!(weights_of(&edit.weight_set), vec![29, 30, 41]);
    }

    #[test]
    fn test_has_adjustable() {
        let set = defaults();
        assert!(has_adjustable(&set, &LockSet::new(), TARGET_UNIT_PRICE));
        let all_but_target: LockSet = set.ids().filter(|id| *id != TARGET_UNIT_PRICE).collect();
        assert!(!has_adjustable(&set, &all_but_target, TARGET_UNIT_PRICE));
    }

    #[test]
    fn test_zero_delta_is_a_no_op() {
        let set = defaults();
        let edit = set_weight(&set, &LockSet::new(), DELIVERY_DATE, 15);
        assert_eq!(edit.weight_set, set);
        assert!(edit.lock_set.is_empty());
    }

    #[test]
    fn test_unknown_parameter_is_a_no_op() {
        let set = defaults();
        let edit = set_weight(&set, &LockSet::new(), "missing", 40);
        assert_eq!(edit.weight_set, set);
        assert!(edit.lock_set.is_empty());
    }

    #[test]
    fn test_toggle_lock_round_trip() {
        let locked = toggle_lock(&LockSet::new(), WARRANTY_PERIOD);
        assert!(locked.contains(WARRANTY_PERIOD));
        let unlocked = toggle_lock(&locked, WARRANTY_PERIOD);
        assert!(unlocked.is_empty());
    }

    #[test]
    fn test_reset_is_idempotent_and_clears_locks() {
        let defs = core_parameter_definitions();
        let table = default_weight_table();
        let edited = set_weight(&defaults(), &LockSet::new(), TARGET_UNIT_PRICE, 60);
        assert!(!edited.lock_set.is_empty());

        let once = reset(&defs, &table);
        let twice = reset(&defs, &table);
        assert_eq!(once, twice);
        assert!(once.lock_set.is_empty());
        assert_eq!(once.weight_set, defaults());
    }

    #[test]
    fn test_prune_drops_removed_parameters() {
        let pruned = prune(&defaults(), [TARGET_UNIT_PRICE, DELIVERY_DATE]);
        assert_eq!(weights_of(&pruned), vec![35, 15]);
        assert_eq!(pruned.total_weight(), 50);
    }

    #[test]
    fn test_reconcile_reinitializes_when_parameters_added() {
        let mut defs = core_parameter_definitions();
        let edited = set_weight(&defaults(), &LockSet::new(), TARGET_UNIT_PRICE, 50);
        defs.push(def("esg", ParameterSource::Custom));

        let rec = reconcile(&edited.weight_set, &edited.lock_set, &defs, &default_weight_table());
        assert_eq!(rec.weight_set.weight_of(TARGET_UNIT_PRICE), Some(35));
        assert_eq!(rec.weight_set.weight_of("esg"), Some(10));
        assert!(rec.lock_set.is_empty());
    }

    #[test]
    fn test_reconcile_prunes_when_parameters_removed() {
        let mut defs = core_parameter_definitions();
        defs.push(def("esg", ParameterSource::Custom));
        let set = initialize(&defs, &default_weight_table());
        let locks: LockSet = ["esg", DELIVERY_DATE].into_iter().collect();

        defs.retain(|d| d.id != "esg");
        let rec = reconcile(&set, &locks, &defs, &default_weight_table());
        assert_eq!(rec.weight_set.len(), 7);
        assert!(!rec.weight_set.contains("esg"));
        assert!(rec.lock_set.contains(DELIVERY_DATE));
        assert!(!rec.lock_set.contains("esg"));
    }
}
