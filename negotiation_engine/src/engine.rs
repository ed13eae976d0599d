//! Negotiation Engine — Weight Engine
//!
//! Stateful wrapper around the pure weight functions. Enforces event
//! sequencing, resolves parameter ids, clamps slider input, and checks
//! invariants on every new state before storing it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::arithmetic::clamp_weight;
use crate::defaults::{core_parameter_definitions, default_weight_table};
use crate::domain::{LockSet, ParameterDefinition, WeightSet};
use crate::error::EngineError;
use crate::events::{WeightCommand, WeightEvent};
use crate::hashing::weight_state_hash;
use crate::invariants::{try_validate_lock_set, try_validate_weight_set};
use crate::weights;

/// Weights plus locks, the full state of the configuration screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightState {
    pub weight_set: WeightSet,
    pub lock_set: LockSet,
}

/// What a single event did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightOutcome {
    pub command: String,
    pub sequence: u64,
    /// Weights or locks differ from before the event.
    pub changed: bool,
    /// A weight edit had no adjustable parameter to absorb the delta.
    pub contention: bool,
    pub total_weight: u32,
    pub shortfall: i64,
}

pub struct WeightEngine {
    initial_definitions: Vec<ParameterDefinition>,
    definitions: Vec<ParameterDefinition>,
    default_table: BTreeMap<String, u32>,
    state: WeightState,
    last_sequence: u64,
}

impl WeightEngine {
    /// Create an engine seeded from the default table, no locks.
    pub fn new(definitions: Vec<ParameterDefinition>, default_table: BTreeMap<String, u32>) -> Self {
        let state = fresh_state(&definitions, &default_table);
        Self {
            initial_definitions: definitions.clone(),
            definitions,
            default_table,
            state,
            last_sequence: 0,
        }
    }

    /// The seven core parameters with their default weights.
    pub fn with_core_defaults() -> Self {
        Self::new(core_parameter_definitions(), default_weight_table())
    }

    pub fn state(&self) -> &WeightState {
        &self.state
    }

    pub fn weight_set(&self) -> &WeightSet {
        &self.state.weight_set
    }

    pub fn lock_set(&self) -> &LockSet {
        &self.state.lock_set
    }

    pub fn definitions(&self) -> &[ParameterDefinition] {
        &self.definitions
    }

    /// Definitions the engine was built with; `replay` starts from these.
    pub fn initial_definitions(&self) -> &[ParameterDefinition] {
        &self.initial_definitions
    }

    pub fn default_table(&self) -> &BTreeMap<String, u32> {
        &self.default_table
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn hash(&self) -> String {
        weight_state_hash(&self.state.weight_set, &self.state.lock_set)
    }

    /// Back to the construction-time definitions and defaults.
    pub fn initialize_state(&mut self) -> &WeightState {
        self.definitions = self.initial_definitions.clone();
        self.state = fresh_state(&self.definitions, &self.default_table);
        self.last_sequence = 0;
        &self.state
    }

    /// Apply a single event:
    ///   1. Validate sequence (strictly increasing, no gaps)
    ///   2. Resolve the parameter id, clamp slider input
    ///   3. Delegate to the pure weight functions
    ///   4. Validate invariants on the new state
    ///   5. Store and return
    ///
    /// On error the engine is left exactly as it was.
    pub fn apply_event(
        &mut self,
        event: &WeightEvent,
    ) -> Result<(&WeightState, WeightOutcome), EngineError> {
        let expected = self.last_sequence + 1;
        if event.sequence != expected {
            return Err(EngineError::SequenceViolation {
                expected,
                got: event.sequence,
            });
        }

        let current = &self.state;
        let mut contention = false;
        let mut definitions = None;

        let next = match &event.command {
            WeightCommand::SetWeight {
                parameter_id,
                weight,
            } => {
                self.require_parameter(parameter_id)?;
                let weight = clamp_weight(*weight);
                let edit = weights::set_weight(
                    &current.weight_set,
                    &current.lock_set,
                    parameter_id,
                    weight,
                );
                contention = current.weight_set.weight_of(parameter_id) != Some(weight)
                    && !weights::has_adjustable(&current.weight_set, &current.lock_set, parameter_id);
                WeightState {
                    weight_set: edit.weight_set,
                    lock_set: edit.lock_set,
                }
            }
            WeightCommand::ToggleLock { parameter_id } => {
                self.require_parameter(parameter_id)?;
                WeightState {
                    weight_set: current.weight_set.clone(),
                    lock_set: weights::toggle_lock(&current.lock_set, parameter_id),
                }
            }
            WeightCommand::Reset => {
                let edit = weights::reset(&self.definitions, &self.default_table);
                WeightState {
                    weight_set: edit.weight_set,
                    lock_set: edit.lock_set,
                }
            }
            WeightCommand::Reconcile {
                definitions: new_definitions,
            } => {
                let edit = weights::reconcile(
                    &current.weight_set,
                    &current.lock_set,
                    new_definitions,
                    &self.default_table,
                );
                definitions = Some(new_definitions.clone());
                WeightState {
                    weight_set: edit.weight_set,
                    lock_set: edit.lock_set,
                }
            }
        };

        try_validate_weight_set(&next.weight_set)?;
        try_validate_lock_set(&next.lock_set, &next.weight_set)?;

        let outcome = WeightOutcome {
            command: event.command.kind().to_string(),
            sequence: event.sequence,
            changed: next != self.state,
            contention,
            total_weight: next.weight_set.total_weight(),
            shortfall: next.weight_set.shortfall(),
        };
        debug!(
            sequence = event.sequence,
            command = outcome.command.as_str(),
            changed = outcome.changed,
            contention = outcome.contention,
            total_weight = outcome.total_weight,
            "weight event applied"
        );

        if let Some(definitions) = definitions {
            self.definitions = definitions;
        }
        self.state = next;
        self.last_sequence = event.sequence;
        Ok((&self.state, outcome))
    }

    /// Apply an ordered sequence of events, stopping at the first error.
    pub fn apply_sequence(&mut self, events: &[WeightEvent]) -> Result<&WeightState, EngineError> {
        for event in events {
            self.apply_event(event)?;
        }
        Ok(&self.state)
    }

    /// Event-sourced reconstruction: reset and replay.
    pub fn replay(&mut self, events: &[WeightEvent]) -> Result<&WeightState, EngineError> {
        self.initialize_state();
        self.apply_sequence(events)
    }

    fn require_parameter(&self, parameter_id: &str) -> Result<(), EngineError> {
        if self.state.weight_set.contains(parameter_id) {
            Ok(())
        } else {
            Err(EngineError::UnknownParameter(parameter_id.to_string()))
        }
    }
}

fn fresh_state(definitions: &[ParameterDefinition], default_table: &BTreeMap<String, u32>) -> WeightState {
    let edit = weights::reset(definitions, default_table);
    WeightState {
        weight_set: edit.weight_set,
        lock_set: edit.lock_set,
    }
}
