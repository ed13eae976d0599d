//! Negotiation Engine — Canonical Hashing
//!
//! Deterministic canonical serialization + SHA-256 hashing, used to
//! check that replays and recomputations are bit-identical.
//!
//! Rules:
//!   - engine_version is always the first field
//!   - Weights keep their wizard order, locks are sorted
//!   - Utility map sorted by label
//!   - UTF-8 JSON, no whitespace; floats as serde_json renders them

use serde_json::{Map, Number, Value};
use sha2::{Digest, Sha256};

use crate::domain::{AdaptiveConfig, LockSet, WeightSet};
use crate::ENGINE_VERSION;

pub fn canonical_weight_state(weight_set: &WeightSet, lock_set: &LockSet) -> Vec<u8> {
    build_weight_value(weight_set, lock_set).to_string().into_bytes()
}

pub fn canonical_adaptive(config: &AdaptiveConfig) -> Vec<u8> {
    build_adaptive_value(config).to_string().into_bytes()
}

/// SHA-256 of the canonical weight state. Lowercase hex.
pub fn weight_state_hash(weight_set: &WeightSet, lock_set: &LockSet) -> String {
    hex_digest(&canonical_weight_state(weight_set, lock_set))
}

/// SHA-256 of the canonical adaptive configuration. Lowercase hex.
pub fn adaptive_hash(config: &AdaptiveConfig) -> String {
    hex_digest(&canonical_adaptive(config))
}

fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
}

fn float(value: f64) -> Value {
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

/// Field order: engine_version, weights, total_weight, locks
fn build_weight_value(weight_set: &WeightSet, lock_set: &LockSet) -> Value {
    let weights: Vec<Value> = weight_set
        .weights()
        .iter()
        .map(|w| {
            let mut m = Map::new();
            m.insert("parameter_id".to_string(), Value::String(w.parameter_id.clone()));
            m.insert("weight".to_string(), Value::Number(w.weight.into()));
            Value::Object(m)
        })
        .collect();

    // LockSet iterates in sorted order.
    let locks: Vec<Value> = lock_set.iter().map(|id| Value::String(id.to_string())).collect();

    let mut root = Map::new();
    root.insert("engine_version".to_string(), Value::Number(ENGINE_VERSION.into()));
    root.insert("weights".to_string(), Value::Array(weights));
    root.insert(
        "total_weight".to_string(),
        Value::Number(weight_set.total_weight().into()),
    );
    root.insert("locks".to_string(), Value::Array(locks));
    Value::Object(root)
}

/// Field order: engine_version, price, payment_terms, accept_threshold,
///              walkaway_threshold, max_rounds
fn build_adaptive_value(config: &AdaptiveConfig) -> Value {
    let mut price = Map::new();
    price.insert("anchor".to_string(), float(config.price.anchor));
    price.insert("target".to_string(), float(config.price.target));
    price.insert("max_acceptable".to_string(), float(config.price.max_acceptable));
    price.insert("concession_step".to_string(), float(config.price.concession_step));

    // BTreeMap is already sorted by label
    let mut utility = Map::new();
    for (label, value) in &config.payment_terms.utility {
        utility.insert(label.clone(), float(*value));
    }

    let mut root = Map::new();
    root.insert("engine_version".to_string(), Value::Number(ENGINE_VERSION.into()));
    root.insert("price".to_string(), Value::Object(price));
    root.insert("payment_terms".to_string(), Value::Object(utility));
    root.insert("accept_threshold".to_string(), float(config.accept_threshold));
    root.insert("walkaway_threshold".to_string(), float(config.walkaway_threshold));
    root.insert("max_rounds".to_string(), Value::Number(config.max_rounds.into()));
    Value::Object(root)
}
