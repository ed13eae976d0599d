//! Session manager — one in-memory negotiation per deal.
//!
//! A session is the caller the kernel expects: it owns the lock set (via
//! the weight engine), the append-only offer history and the current
//! round, and recomputes the adaptive configuration on every round change.
//! Nothing is persisted.
//!
//! Concurrency: `SharedSession` serializes access with a Mutex; there is
//! no global mutable state.

use std::collections::BTreeMap;
use std::sync::Mutex;

use tracing::{debug, info};

use negotiation_engine::adaptive::{history_through, recompute_with, AdaptiveConstants};
use negotiation_engine::domain::{AdaptiveConfig, NegotiationConfig, OfferRecord, ParameterDefinition};
use negotiation_engine::engine::{WeightEngine, WeightOutcome, WeightState};
use negotiation_engine::events::WeightEvent;
use negotiation_engine::hashing::adaptive_hash;
use negotiation_engine::invariants::try_validate_config;
use negotiation_engine::recommendation::{offer_utility, recommend, Recommendation, UtilityWeights};

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};

/// Display signal for one incoming offer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OfferSignal {
    pub utility: f64,
    pub recommendation: Recommendation,
}

pub struct NegotiationSession {
    session_id: String,
    weights: WeightEngine,
    base_config: NegotiationConfig,
    constants: AdaptiveConstants,
    offers: Vec<OfferRecord>,
    /// Offers the current `adaptive` was derived from.
    recomputed_offers: usize,
    weight_events: Vec<WeightEvent>,
    round: u32,
    adaptive: AdaptiveConfig,
}

impl NegotiationSession {
    /// Create a session at round 0 with default weights and no offers.
    /// The base configuration is validated once here.
    pub fn new(
        session_id: &str,
        definitions: Vec<ParameterDefinition>,
        base_config: NegotiationConfig,
        runtime: &RuntimeConfig,
    ) -> Result<Self> {
        try_validate_config(&base_config)?;

        let weights = WeightEngine::new(definitions, runtime.default_weights.clone());
        let adaptive = AdaptiveConfig::from(&base_config);
        info!(
            session_id,
            parameters = weights.weight_set().len(),
            max_rounds = base_config.max_rounds,
            "negotiation session created"
        );

        Ok(Self {
            session_id: session_id.to_string(),
            weights,
            base_config,
            constants: runtime.adaptive.clone(),
            offers: Vec::new(),
            recomputed_offers: 0,
            weight_events: Vec::new(),
            round: 0,
            adaptive,
        })
    }

    /// Apply a weight event and keep it for replay.
    pub fn apply_weight_event(&mut self, event: &WeightEvent) -> Result<(WeightState, WeightOutcome)> {
        let (state, outcome) = self.weights.apply_event(event)?;
        let state = state.clone();
        self.weight_events.push(event.clone());
        Ok((state, outcome))
    }

    /// Append an offer. Offers for rounds already left behind are rejected;
    /// the current round's configuration is not recomputed until the next
    /// round change.
    pub fn record_offer(&mut self, offer: OfferRecord) -> Result<()> {
        if offer.round < self.round {
            return Err(RuntimeError::OfferOutOfOrder {
                offer_round: offer.round,
                current_round: self.round,
            });
        }
        debug!(
            session_id = self.session_id.as_str(),
            round = offer.round,
            origin = ?offer.origin,
            "offer recorded"
        );
        self.offers.push(offer);
        Ok(())
    }

    /// Move to `round` and recompute the adaptive configuration from the
    /// offers made up to that round. Offers already stamped for a later
    /// round wait until the session reaches it. Staying on the same round
    /// recomputes in place.
    pub fn advance_round(&mut self, round: u32) -> Result<&AdaptiveConfig> {
        if round < self.round {
            return Err(RuntimeError::RoundRegression {
                current: self.round,
                requested: round,
            });
        }
        self.round = round;
        self.recomputed_offers = self.offers.len();
        self.adaptive = recompute_with(
            &self.base_config,
            &history_through(&self.offers, round),
            round,
            self.base_config.max_rounds,
            &self.constants,
        );
        info!(
            session_id = self.session_id.as_str(),
            round,
            accept = self.adaptive.accept_threshold,
            walkaway = self.adaptive.walkaway_threshold,
            target = self.adaptive.price.target,
            "round advanced"
        );
        Ok(&self.adaptive)
    }

    /// Score an offer against the current round's configuration.
    pub fn recommendation_for(&self, offer: &OfferRecord) -> Option<OfferSignal> {
        let weights = UtilityWeights::from_weight_set(self.weights.weight_set());
        offer_utility(offer, &self.adaptive, &weights).map(|utility| OfferSignal {
            utility,
            recommendation: recommend(utility, &self.adaptive),
        })
    }

    pub fn adaptive(&self) -> &AdaptiveConfig {
        &self.adaptive
    }

    pub fn base_config(&self) -> &NegotiationConfig {
        &self.base_config
    }

    pub fn constants(&self) -> &AdaptiveConstants {
        &self.constants
    }

    pub fn weight_state(&self) -> &WeightState {
        self.weights.state()
    }

    pub fn definitions(&self) -> &[ParameterDefinition] {
        self.weights.definitions()
    }

    pub fn initial_definitions(&self) -> &[ParameterDefinition] {
        self.weights.initial_definitions()
    }

    pub fn default_table(&self) -> &BTreeMap<String, u32> {
        self.weights.default_table()
    }

    pub fn offers(&self) -> &[OfferRecord] {
        &self.offers
    }

    /// The prefix of the offer history seen by the last round change.
    pub fn recomputed_offers(&self) -> &[OfferRecord] {
        &self.offers[..self.recomputed_offers]
    }

    pub fn weight_events(&self) -> &[WeightEvent] {
        &self.weight_events
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn weight_hash(&self) -> String {
        self.weights.hash()
    }

    pub fn adaptive_hash(&self) -> String {
        adaptive_hash(&self.adaptive)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Thread-safe session handle using Mutex.
pub struct SharedSession {
    inner: Mutex<NegotiationSession>,
}

impl SharedSession {
    pub fn new(session: NegotiationSession) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    fn with<T>(&self, f: impl FnOnce(&mut NegotiationSession) -> Result<T>) -> Result<T> {
        let mut session = self.inner.lock().map_err(|_| RuntimeError::LockPoisoned)?;
        f(&mut session)
    }

    pub fn apply_weight_event(&self, event: &WeightEvent) -> Result<(WeightState, WeightOutcome)> {
        self.with(|s| s.apply_weight_event(event))
    }

    pub fn record_offer(&self, offer: OfferRecord) -> Result<()> {
        self.with(|s| s.record_offer(offer))
    }

    pub fn advance_round(&self, round: u32) -> Result<AdaptiveConfig> {
        self.with(|s| s.advance_round(round).cloned())
    }

    pub fn recommendation_for(&self, offer: &OfferRecord) -> Result<Option<OfferSignal>> {
        self.with(|s| Ok(s.recommendation_for(offer)))
    }

    pub fn weight_hash(&self) -> Result<String> {
        self.with(|s| Ok(s.weight_hash()))
    }

    pub fn adaptive_hash(&self) -> Result<String> {
        self.with(|s| Ok(s.adaptive_hash()))
    }

    pub fn round(&self) -> Result<u32> {
        self.with(|s| Ok(s.round()))
    }
}
