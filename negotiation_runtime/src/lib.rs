#![forbid(unsafe_code)]

//! Negotiation Runtime
//!
//! In-memory sessions around the negotiation engine: lock ownership,
//! offer history, round progress, replay and drift detection.
//!
//! No domain logic lives here — weight redistribution and adaptive
//! recomputation are delegated to the engine.

pub mod error;
pub mod config;
pub mod replay;
pub mod session;
pub mod drift;

pub use error::{Result, RuntimeError};
