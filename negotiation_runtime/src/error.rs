//! Runtime errors. Kernel rejections pass through unchanged.

use std::path::PathBuf;

use negotiation_engine::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Engine rejected input: {0}")]
    Engine(#[from] EngineError),

    #[error("Offer for round {offer_round} arrived after round {current_round}")]
    OfferOutOfOrder { offer_round: u32, current_round: u32 },

    #[error("Round cannot move backwards: {current} -> {requested}")]
    RoundRegression { current: u32, requested: u32 },

    #[error("Determinism failure: replays produced {first} and {second}")]
    Determinism { first: String, second: String },

    #[error("Session lock poisoned")]
    LockPoisoned,

    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    ConfigInvalid(String),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
