//! Negotiation Engine — Errors
//!
//! The pure weight and adaptive functions are total. These errors only
//! come out of the event-driven engine and the invariant checks.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Sequence violation: expected {expected}, got {got}")]
    SequenceViolation { expected: u64, got: u64 },

    #[error("Unknown parameter: {0:?}")]
    UnknownParameter(String),

    #[error("Invalid parameter id {0:?}: must match [a-zA-Z0-9_-]+")]
    InvalidParameterId(String),

    #[error("Duplicate parameter id: {0:?}")]
    DuplicateParameter(String),

    #[error("Weight {weight} for {parameter_id:?} is outside [0, 100]")]
    WeightOutOfRange { parameter_id: String, weight: u32 },

    #[error("Cached total {cached} does not match weight sum {actual}")]
    TotalMismatch { cached: u32, actual: u32 },

    #[error("Lock references unknown parameter: {0:?}")]
    UnknownLock(String),

    #[error("Threshold {name} = {value} is outside [0, 1]")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("Walk-away threshold {walkaway} exceeds accept threshold {accept}")]
    InvertedThresholds { accept: f64, walkaway: f64 },

    #[error("Payment-term utility for {label:?} = {value} is outside [0, 1]")]
    InvalidUtility { label: String, value: f64 },

    #[error("Invalid price band: target {target} exceeds max acceptable {max_acceptable}")]
    InvalidPriceBand { target: f64, max_acceptable: f64 },

    #[error("max_rounds must be at least 1")]
    InvalidMaxRounds,
}
