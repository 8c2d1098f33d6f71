//! CLI configuration

use crate::error::{CliError, CliResult};
use mic_reward::{MintingPolicy, StaticHealthProvider};
use mic_types::is_unit_interval;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "micctl.toml";

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MicConfig {
    /// Reward thresholds, multipliers and bonuses
    #[serde(default)]
    pub policy: MintingPolicy,

    #[serde(default)]
    pub health: HealthConfig,

    #[serde(default)]
    pub ledger: LedgerViewConfig,
}

/// GII source used when `MIC_GII_OVERRIDE` is unset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_gii")]
    pub gii: f64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self { gii: default_gii() }
    }
}

/// History display limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerViewConfig {
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    #[serde(default = "default_page_limit")]
    pub page_limit: usize,
}

impl Default for LedgerViewConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
            page_limit: default_page_limit(),
        }
    }
}

fn default_gii() -> f64 {
    StaticHealthProvider::DEFAULT_GII
}

fn default_recent_limit() -> usize {
    10
}

fn default_page_limit() -> usize {
    50
}

impl MicConfig {
    /// Load configuration from file
    ///
    /// A missing file yields the defaults; a present but invalid one is an
    /// error.
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let config_path = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));

        if !config_path.exists() {
            return Ok(MicConfig::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;
        let config: MicConfig =
            toml::from_str(&contents).map_err(|e| CliError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CliResult<()> {
        self.policy.validate()?;
        if !is_unit_interval(self.health.gii) {
            return Err(CliError::Config(format!(
                "health.gii must be within [0, 1], got {}",
                self.health.gii
            )));
        }
        if self.ledger.page_limit == 0 {
            return Err(CliError::Config("ledger.page_limit must be positive".into()));
        }
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> CliResult<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))
    }
}
