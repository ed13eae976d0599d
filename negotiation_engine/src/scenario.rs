//! Negotiation Engine — Scenario Runner
//!
//! Drives a whole negotiation from a JSON description: weight events,
//! then the adaptive configuration and recommendation for every round.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::adaptive::{history_through, recompute_with, AdaptiveConstants};
use crate::defaults::{core_parameter_definitions, default_weight_table};
use crate::domain::{AdaptiveConfig, CustomParameter, NegotiationConfig, OfferRecord, ParameterDefinition};
use crate::engine::{WeightEngine, WeightOutcome, WeightState};
use crate::error::EngineError;
use crate::events::WeightEvent;
use crate::hashing::adaptive_hash;
use crate::invariants::try_validate_config;
use crate::recommendation::{offer_utility, recommend, Recommendation, UtilityWeights};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default = "core_parameter_definitions")]
    pub definitions: Vec<ParameterDefinition>,
    #[serde(default)]
    pub custom_parameters: Vec<CustomParameter>,
    #[serde(default = "default_weight_table")]
    pub default_weights: BTreeMap<String, u32>,
    #[serde(default)]
    pub weight_events: Vec<WeightEvent>,
    pub config: NegotiationConfig,
    #[serde(default)]
    pub offers: Vec<OfferRecord>,
    #[serde(default)]
    pub constants: AdaptiveConstants,
}

impl Scenario {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Core/wizard definitions followed by the weighted custom parameters.
    pub fn all_definitions(&self) -> Vec<ParameterDefinition> {
        self.definitions
            .iter()
            .cloned()
            .chain(self.custom_parameters.iter().filter_map(CustomParameter::to_definition))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundReport {
    pub round: u32,
    pub adaptive: AdaptiveConfig,
    pub adaptive_hash: String,
    /// Utility of the counterparty's latest offer in this round.
    pub utility: Option<f64>,
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub weight_state: WeightState,
    /// Final id → weight map handed to the negotiation screen.
    pub weights: BTreeMap<String, u32>,
    pub weight_hash: String,
    pub outcomes: Vec<WeightOutcome>,
    pub rounds: Vec<RoundReport>,
}

pub fn run(scenario: &Scenario) -> Result<ScenarioReport, EngineError> {
    try_validate_config(&scenario.config)?;

    let mut engine = WeightEngine::new(scenario.all_definitions(), scenario.default_weights.clone());
    let mut outcomes = Vec::with_capacity(scenario.weight_events.len());
    for event in &scenario.weight_events {
        let (_, outcome) = engine.apply_event(event)?;
        outcomes.push(outcome);
    }

    let utility_weights = UtilityWeights::from_weight_set(engine.weight_set());
    let max_rounds = scenario.config.max_rounds;
    let rounds = (1..=max_rounds)
        .map(|round| {
            let history = history_through(&scenario.offers, round);
            let adaptive = recompute_with(&scenario.config, &history, round, max_rounds, &scenario.constants);
            let utility = history
                .iter()
                .rev()
                .find(|o| o.is_counterparty() && o.round == round)
                .and_then(|o| offer_utility(o, &adaptive, &utility_weights));
            RoundReport {
                round,
                adaptive_hash: adaptive_hash(&adaptive),
                recommendation: utility.map(|u| recommend(u, &adaptive)),
                utility,
                adaptive,
            }
        })
        .collect();

    Ok(ScenarioReport {
        weights: engine.weight_set().as_map(),
        weight_state: engine.state().clone(),
        weight_hash: engine.hash(),
        outcomes,
        rounds,
    })
}
