//! Ledger configuration
//!
//! Settings can be parsed from JSON, overridden from the environment, or built
//! programmatically.

use crate::constants::{CUTOFF_AGE, DEFAULT_BLOCK_REWARD};
use crate::error::{LedgerError, Result};
use crate::types::{Amount, Height};
use log::warn;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// How many blocks a branch may lag behind the deepest branch and still be extended
    #[serde(default = "default_cutoff_age")]
    pub cutoff_age: Height,

    /// Reward paid to the proposer by `BlockTree::create_block`
    #[serde(default = "default_block_reward")]
    pub block_reward: Amount,

    /// Discard nodes that can no longer become part of the deepest branch
    #[serde(default = "default_true")]
    pub prune: bool,
}

fn default_cutoff_age() -> Height {
    CUTOFF_AGE
}

fn default_block_reward() -> Amount {
    DEFAULT_BLOCK_REWARD
}

fn default_true() -> bool {
    true
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            cutoff_age: CUTOFF_AGE,
            block_reward: DEFAULT_BLOCK_REWARD,
            prune: true,
        }
    }
}

impl LedgerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `LEDGER_CORE_*` environment variables.
    ///
    /// Unparseable values are logged and ignored; the result is validated.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(age) = env_override::<Height>("LEDGER_CORE_CUTOFF_AGE") {
            config.cutoff_age = age;
        }

        if let Some(reward) = env_override::<Amount>("LEDGER_CORE_BLOCK_REWARD") {
            config.block_reward = reward;
        }

        if let Some(prune) = env_override::<bool>("LEDGER_CORE_PRUNE") {
            config.prune = prune;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cutoff_age == 0 {
            return Err(LedgerError::Config("cutoff_age must be at least 1".to_string()));
        }
        if self.block_reward < 0 {
            return Err(LedgerError::Config(format!(
                "block_reward must be non-negative, got {}",
                self.block_reward
            )));
        }
        Ok(())
    }
}

fn env_override<T: std::str::FromStr>(name: &str) -> Option<T> {
    let val = std::env::var(name).ok()?;
    match val.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("ignoring unparseable {}={:?}", name, val);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert_eq!(config.cutoff_age, 10);
        assert_eq!(config.block_reward, 25 * crate::constants::COIN);
        assert!(config.prune);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = LedgerConfig::from_json(r#"{ "cutoff_age": 3 }"#).unwrap();
        assert_eq!(config.cutoff_age, 3);
        assert_eq!(config.block_reward, DEFAULT_BLOCK_REWARD);
        assert!(config.prune);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(LedgerConfig::from_json(r#"{ "cutoff_age": 0 }"#).is_err());
        assert!(LedgerConfig::from_json(r#"{ "block_reward": -1 }"#).is_err());
        assert!(LedgerConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_from_env_overrides_and_validates() {
        // Only this test touches LEDGER_CORE_* variables
        std::env::set_var("LEDGER_CORE_CUTOFF_AGE", "4");
        std::env::set_var("LEDGER_CORE_PRUNE", "not-a-bool");
        std::env::remove_var("LEDGER_CORE_BLOCK_REWARD");
        let config = LedgerConfig::from_env().unwrap();
        assert_eq!(config.cutoff_age, 4);
        assert!(config.prune);

        std::env::set_var("LEDGER_CORE_CUTOFF_AGE", "0");
        assert!(LedgerConfig::from_env().is_err());

        std::env::remove_var("LEDGER_CORE_CUTOFF_AGE");
        std::env::remove_var("LEDGER_CORE_PRUNE");
    }

    #[test]
    fn test_roundtrip_json() {
        let config = LedgerConfig {
            cutoff_age: 4,
            block_reward: 7,
            prune: false,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(LedgerConfig::from_json(&json).unwrap(), config);
    }
}
