#![forbid(unsafe_code)]

//! Negotiation Engine — weight allocation and adaptive configuration.
//!
//! Pure, deterministic functions over explicit state. Nothing in this
//! crate persists, blocks, or keeps hidden globals.

/// Engine identity, bound into every canonical hash.
pub const ENGINE_VERSION: u32 = 1;

pub mod arithmetic;
pub mod error;
pub mod domain;
pub mod defaults;
pub mod weights;
pub mod adaptive;
pub mod recommendation;
pub mod invariants;
pub mod hashing;
pub mod events;
pub mod engine;
pub mod scenario;

pub use error::EngineError;
