//! Runtime configuration — JSON, every field optional.
//!
//! ```json
//! { "max_rounds": 8, "default_weights": { "targetUnitPrice": 40 }, "adaptive": { "target_premium": 1.03 } }
//! ```
//!
//! A partial `default_weights` map replaces the whole core table.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use negotiation_engine::adaptive::AdaptiveConstants;
use negotiation_engine::arithmetic::MAX_WEIGHT;
use negotiation_engine::defaults::default_weight_table;

use crate::error::{Result, RuntimeError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    pub adaptive: AdaptiveConstants,
    pub default_weights: BTreeMap<String, u32>,
    pub max_rounds: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            adaptive: AdaptiveConstants::default(),
            default_weights: default_weight_table(),
            max_rounds: 10,
        }
    }
}

impl RuntimeConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RuntimeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|source| RuntimeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&data)?;
        info!(path = %path.display(), max_rounds = config.max_rounds, "runtime config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_rounds == 0 {
            return Err(RuntimeError::ConfigInvalid("max_rounds must be at least 1".to_string()));
        }
        if let Some((id, w)) = self.default_weights.iter().find(|(_, w)| **w > MAX_WEIGHT) {
            return Err(RuntimeError::ConfigInvalid(format!(
                "default weight for {:?} is {}, above {}",
                id, w, MAX_WEIGHT
            )));
        }

        let a = &self.adaptive;
        let unit = [
            ("accept_floor", a.accept_floor),
            ("walkaway_floor", a.walkaway_floor),
            ("term_dominance_ratio", a.term_dominance_ratio),
            ("anchor_drift", a.anchor_drift),
        ];
        if let Some((name, value)) = unit.iter().find(|(_, v)| !(0.0..=1.0).contains(v)) {
            return Err(RuntimeError::ConfigInvalid(format!(
                "{} = {} is outside [0, 1]",
                name, value
            )));
        }
        if a.target_premium < 1.0 || a.term_utility_boost < 1.0 {
            return Err(RuntimeError::ConfigInvalid(
                "target_premium and term_utility_boost must be at least 1".to_string(),
            ));
        }
        if a.accept_decay < 0.0 || a.walkaway_decay < 0.0 {
            return Err(RuntimeError::ConfigInvalid("decay rates must be non-negative".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = RuntimeConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.default_weights.values().sum::<u32>(), 100);
    }

    #[test]
    fn test_partial_overrides() {
        let config =
            RuntimeConfig::from_json_str(r#"{"max_rounds": 8, "adaptive": {"target_premium": 1.03}}"#).unwrap();
        assert_eq!(config.max_rounds, 8);
        assert_eq!(config.adaptive.target_premium, 1.03);
        assert_eq!(config.adaptive.accept_floor, 0.5);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            RuntimeConfig::from_json_str(r#"{"max_rounds": 0}"#),
            Err(RuntimeError::ConfigInvalid(_))
        ));
        assert!(matches!(
            RuntimeConfig::from_json_str(r#"{"default_weights": {"targetUnitPrice": 140}}"#),
            Err(RuntimeError::ConfigInvalid(_))
        ));
        assert!(matches!(
            RuntimeConfig::from_json_str(r#"{"adaptive": {"accept_floor": 1.5}}"#),
            Err(RuntimeError::ConfigInvalid(_))
        ));
        assert!(matches!(
            RuntimeConfig::from_json_str(r#"{"unknown": 1}"#),
            Err(RuntimeError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = RuntimeConfig::load(Path::new("/nonexistent/negotiation.json")).unwrap_err();
        assert!(matches!(err, RuntimeError::ConfigRead { .. }));
    }
}
