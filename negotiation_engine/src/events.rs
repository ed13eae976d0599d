//! Negotiation Engine — Weight Events
//!
//! Events are pure data: a sequence number and the user's intent.
//! They contain no redistribution logic.

use serde::{Deserialize, Serialize};

use crate::domain::ParameterDefinition;

/// A user action on the weight configuration screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WeightCommand {
    /// Slider edit. The weight is clamped to [0, 100] before it is applied.
    SetWeight { parameter_id: String, weight: i64 },
    ToggleLock { parameter_id: String },
    Reset,
    /// Upstream parameter list changed.
    Reconcile { definitions: Vec<ParameterDefinition> },
}

impl WeightCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            WeightCommand::SetWeight { .. } => "set_weight",
            WeightCommand::ToggleLock { .. } => "toggle_lock",
            WeightCommand::Reset => "reset",
            WeightCommand::Reconcile { .. } => "reconcile",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightEvent {
    pub sequence: u64,
    pub command: WeightCommand,
}

impl WeightEvent {
    pub fn new(sequence: u64, command: WeightCommand) -> Self {
        Self { sequence, command }
    }

    pub fn set_weight(sequence: u64, parameter_id: &str, weight: i64) -> Self {
        Self::new(
            sequence,
            WeightCommand::SetWeight {
                parameter_id: parameter_id.to_string(),
                weight,
            },
        )
    }

    pub fn toggle_lock(sequence: u64, parameter_id: &str) -> Self {
        Self::new(
            sequence,
            WeightCommand::ToggleLock {
                parameter_id: parameter_id.to_string(),
            },
        )
    }
}
