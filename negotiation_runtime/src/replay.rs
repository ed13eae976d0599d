//! Replay orchestrator — rebuild state from recorded inputs.
//!
//! Delegates all domain logic to the kernel. No shortcuts, no cached
//! state.

use std::collections::BTreeMap;

use negotiation_engine::adaptive::{history_through, recompute_with, AdaptiveConstants};
use negotiation_engine::domain::{AdaptiveConfig, NegotiationConfig, OfferRecord, ParameterDefinition};
use negotiation_engine::engine::{WeightEngine, WeightState};
use negotiation_engine::events::WeightEvent;
use negotiation_engine::hashing::adaptive_hash;

use crate::error::Result;

/// Rebuild the weight state from a sequence of weight events.
///
/// 1. Create a fresh engine seeded from the definitions
/// 2. Pass each event sequentially to the kernel
/// 3. Return (final_state, canonical_hash)
pub fn rebuild_weights(
    definitions: &[ParameterDefinition],
    default_table: &BTreeMap<String, u32>,
    events: &[WeightEvent],
) -> Result<(WeightState, String)> {
    let mut engine = WeightEngine::new(definitions.to_vec(), default_table.clone());
    engine.apply_sequence(events)?;
    Ok((engine.state().clone(), engine.hash()))
}

/// Recompute the adaptive configuration for `round` from the offer history.
/// Offers stamped for later rounds are ignored.
pub fn rebuild_adaptive(
    base: &NegotiationConfig,
    offers: &[OfferRecord],
    round: u32,
    constants: &AdaptiveConstants,
) -> (AdaptiveConfig, String) {
    let history = history_through(offers, round);
    let adaptive = recompute_with(base, &history, round, base.max_rounds, constants);
    let hash = adaptive_hash(&adaptive);
    (adaptive, hash)
}
