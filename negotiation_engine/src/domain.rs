//! Negotiation Engine — Core Domain Types
//!
//! Pure data. Weight redistribution lives in `weights`, per-round
//! recomputation in `adaptive`.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::arithmetic::{sum_weights, WEIGHT_TOTAL};

// ── Parameters ─────────────────────────────────────────────────────

/// Where a negotiable parameter came from in the configuration wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterSource {
    CoreStep2,
    CoreStep3,
    Custom,
}

/// A parameter as defined by the wizard, before any weight is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterDefinition {
    pub id: String,
    pub name: String,
    pub source: ParameterSource,
}

impl ParameterDefinition {
    pub fn new(id: &str, name: &str, source: ParameterSource) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            source,
        }
    }

    pub fn is_custom(&self) -> bool {
        self.source == ParameterSource::Custom
    }
}

/// Value carried by a user-authored custom parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CustomParameterValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

/// Custom parameter captured by the wizard. Only those flagged
/// `include_in_weights` take part in weight allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomParameter {
    pub id: String,
    pub name: String,
    pub value: CustomParameterValue,
    pub include_in_weights: bool,
}

impl CustomParameter {
    pub fn to_definition(&self) -> Option<ParameterDefinition> {
        self.include_in_weights
            .then(|| ParameterDefinition::new(&self.id, &self.name, ParameterSource::Custom))
    }
}

/// One negotiable dimension with its importance weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterWeight {
    pub parameter_id: String,
    pub parameter_name: String,
    pub weight: u32,
    pub source: ParameterSource,
}

impl ParameterWeight {
    pub fn from_definition(def: &ParameterDefinition, weight: u32) -> Self {
        Self {
            parameter_id: def.id.clone(),
            parameter_name: def.name.clone(),
            weight,
            source: def.source,
        }
    }
}

// ── Weight sets and locks ──────────────────────────────────────────

#[derive(Deserialize)]
struct RawWeightSet {
    weights: Vec<ParameterWeight>,
}

impl From<RawWeightSet> for WeightSet {
    fn from(raw: RawWeightSet) -> Self {
        WeightSet::new(raw.weights)
    }
}

/// Ordered parameter weights plus their cached total.
///
/// The total is derived on construction and never assigned independently;
/// a deserialized total is ignored and recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawWeightSet")]
pub struct WeightSet {
    weights: Vec<ParameterWeight>,
    total_weight: u32,
}

impl WeightSet {
    pub fn new(weights: Vec<ParameterWeight>) -> Self {
        let total_weight = sum_weights(weights.iter().map(|w| w.weight));
        Self {
            weights,
            total_weight,
        }
    }

    pub fn weights(&self) -> &[ParameterWeight] {
        &self.weights
    }

    pub fn total_weight(&self) -> u32 {
        self.total_weight
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn get(&self, parameter_id: &str) -> Option<&ParameterWeight> {
        self.weights.iter().find(|w| w.parameter_id == parameter_id)
    }

    pub fn weight_of(&self, parameter_id: &str) -> Option<u32> {
        self.get(parameter_id).map(|w| w.weight)
    }

    pub fn contains(&self, parameter_id: &str) -> bool {
        self.get(parameter_id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.weights.iter().map(|w| w.parameter_id.as_str())
    }

    /// True when the weights sum to exactly 100.
    pub fn is_balanced(&self) -> bool {
        self.total_weight == WEIGHT_TOTAL
    }

    /// Points still missing to reach 100. Negative when over-allocated.
    pub fn shortfall(&self) -> i64 {
        WEIGHT_TOTAL as i64 - self.total_weight as i64
    }

    /// Id → weight view, as handed to the negotiation screen.
    pub fn as_map(&self) -> BTreeMap<String, u32> {
        self.weights
            .iter()
            .map(|w| (w.parameter_id.clone(), w.weight))
            .collect()
    }
}

/// Parameter ids excluded from automatic redistribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockSet(BTreeSet<String>);

impl LockSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn contains(&self, parameter_id: &str) -> bool {
        self.0.contains(parameter_id)
    }

    pub fn insert(&mut self, parameter_id: &str) -> bool {
        self.0.insert(parameter_id.to_string())
    }

    pub fn remove(&mut self, parameter_id: &str) -> bool {
        self.0.remove(parameter_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }
}

impl<S: Into<String>> FromIterator<S> for LockSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// ── Offers ─────────────────────────────────────────────────────────

/// Which side of the table an offer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferOrigin {
    #[serde(rename = "counterparty")]
    Counterparty,
    #[serde(rename = "self")]
    SelfParty,
}

/// One side's offer in one round. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OfferRecord {
    pub unit_price: Option<f64>,
    pub payment_terms_days: Option<u32>,
    pub round: u32,
    pub origin: OfferOrigin,
}

impl OfferRecord {
    pub fn counterparty(round: u32, unit_price: Option<f64>, payment_terms_days: Option<u32>) -> Self {
        Self {
            unit_price,
            payment_terms_days,
            round,
            origin: OfferOrigin::Counterparty,
        }
    }

    pub fn own(round: u32, unit_price: Option<f64>, payment_terms_days: Option<u32>) -> Self {
        Self {
            unit_price,
            payment_terms_days,
            round,
            origin: OfferOrigin::SelfParty,
        }
    }

    pub fn is_counterparty(&self) -> bool {
        self.origin == OfferOrigin::Counterparty
    }

    pub fn payment_terms_label(&self) -> Option<String> {
        self.payment_terms_days.map(payment_terms_label)
    }
}

/// Utility-map key for a payment term, e.g. `Net 30`.
pub fn payment_terms_label(days: u32) -> String {
    format!("Net {}", days)
}

// ── Configuration ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PriceConfig {
    pub anchor: f64,
    pub target: f64,
    pub max_acceptable: f64,
    pub concession_step: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaymentTermsConfig {
    /// Term label → utility in [0, 1].
    pub utility: BTreeMap<String, f64>,
}

/// Base, user-authored negotiation configuration. Created once per deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NegotiationConfig {
    pub price: PriceConfig,
    pub payment_terms: PaymentTermsConfig,
    pub accept_threshold: f64,
    pub walkaway_threshold: f64,
    pub max_rounds: u32,
}

/// Round-specific configuration derived from a `NegotiationConfig`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdaptiveConfig {
    pub price: PriceConfig,
    pub payment_terms: PaymentTermsConfig,
    pub accept_threshold: f64,
    pub walkaway_threshold: f64,
    pub max_rounds: u32,
}

impl From<&NegotiationConfig> for AdaptiveConfig {
    fn from(base: &NegotiationConfig) -> Self {
        Self {
            price: base.price.clone(),
            payment_terms: base.payment_terms.clone(),
            accept_threshold: base.accept_threshold,
            walkaway_threshold: base.walkaway_threshold,
            max_rounds: base.max_rounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pw(id: &str, weight: u32) -> ParameterWeight {
        ParameterWeight {
            parameter_id: id.to_string(),
            parameter_name: id.to_string(),
            weight,
            source: ParameterSource::CoreStep2,
        }
    }

    #[test]
    fn test_total_is_derived() {
        let set = WeightSet::new(vec![pw("a", 60), pw("b", 30)]);
        assert_eq!(set.total_weight(), 90);
        assert!(!set.is_balanced());
        assert_eq!(set.shortfall(), 10);
    }

    #[test]
    fn test_as_map_keys_by_id() {
        let set = WeightSet::new(vec![pw("b", 30), pw("a", 70)]);
        let map = set.as_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], 70);
        assert_eq!(map["b"], 30);
    }

    #[test]
    fn test_deserialized_total_is_recomputed() {
        let json = r#"{"weights":[
            {"parameter_id":"a","parameter_name":"A","weight":70,"source":"core_step2"},
            {"parameter_id":"b","parameter_name":"B","weight":30,"source":"custom"}
        ],"total_weight":5}"#;
        let set: WeightSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.total_weight(), 100);
        assert!(set.is_balanced());
    }

    #[test]
    fn test_custom_parameter_definition() {
        let included = CustomParameter {
            id: "esg".to_string(),
            name: "ESG score".to_string(),
            value: CustomParameterValue::Number(4.5),
            include_in_weights: true,
        };
        let excluded = CustomParameter {
            include_in_weights: false,
            ..included.clone()
        };
        let def = included.to_definition().unwrap();
        assert_eq!(def.source, ParameterSource::Custom);
        assert!(excluded.to_definition().is_none());
    }

    #[test]
    fn test_custom_value_tagging() {
        let value = CustomParameterValue::Date(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"type":"date","value":"2026-03-01"}"#);
        let back: CustomParameterValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_offer_origin_wire_names() {
        let offer = OfferRecord::own(2, Some(90.0), Some(45));
        let json = serde_json::to_value(&offer).unwrap();
        assert_eq!(json["origin"], "self");
        assert_eq!(offer.payment_terms_label().as_deref(), Some("Net 45"));
    }

    #[test]
    fn test_lock_set_ops() {
        let mut locks = LockSet::new();
        assert!(locks.insert("a"));
        assert!(!locks.insert("a"));
        assert!(locks.contains("a"));
        assert!(locks.remove("a"));
        assert!(locks.is_empty());
    }
}
