//! Negotiation Engine — Arithmetic Primitives
//!
//! Weights are whole percentage points (u32). Redistribution runs in f64
//! and is rounded back with `round_half_up`.

/// Every balanced weight set sums to exactly this.
pub const WEIGHT_TOTAL: u32 = 100;

/// Upper bound for a single weight.
pub const MAX_WEIGHT: u32 = 100;

/// Points reserved for custom parameters at initialization, split evenly.
pub const CUSTOM_RESERVATION: u32 = 10;

/// Round to the nearest integer, halves rounding towards +inf.
///
/// `2.5 -> 3`, `-2.5 -> -2`. Matches what the configuration screens
/// display, which `f64::round` (half away from zero) does not for negatives.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Clamp an arbitrary signed slider value into `[0, MAX_WEIGHT]`.
pub fn clamp_weight(value: i64) -> u32 {
    value.clamp(0, MAX_WEIGHT as i64) as u32
}

/// Saturating sum of weights.
pub fn sum_weights<I>(weights: I) -> u32
where
    I: IntoIterator<Item = u32>,
{
    weights.into_iter().fold(0u32, |acc, w| acc.saturating_add(w))
}

/// Parameter ids are non-empty ASCII `[a-zA-Z0-9_-]+`.
pub fn is_valid_parameter_id(parameter_id: &str) -> bool {
    !parameter_id.is_empty()
        && parameter_id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
}
