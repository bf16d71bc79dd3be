use crate::errors::ConfigError;
use pagecraft_seo::GateConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "pagecraft.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum number of undo entries
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Quiet period separating continuous-edit undo steps
    #[serde(default = "default_history_debounce_ms")]
    pub history_debounce_ms: u64,

    #[serde(default = "default_autosave_debounce_ms")]
    pub autosave_debounce_ms: u64,

    /// How long the "saved" indicator stays up
    #[serde(default = "default_saved_indicator_ms")]
    pub saved_indicator_ms: u64,

    #[serde(default = "default_lock_poll_interval_ms")]
    pub lock_poll_interval_ms: u64,

    /// Only arm autosave while the page is a draft
    #[serde(default = "default_true")]
    pub autosave_only_drafts: bool,

    /// Publish gate
    #[serde(default)]
    pub seo: GateConfig,
}

fn default_history_limit() -> usize {
    50
}

fn default_history_debounce_ms() -> u64 {
    500
}

fn default_autosave_debounce_ms() -> u64 {
    30_000
}

fn default_saved_indicator_ms() -> u64 {
    3_000
}

fn default_lock_poll_interval_ms() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

impl EditorConfig {
    /// Load config from a directory, falling back to defaults
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json_str(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid(
                "historyLimit must be at least 1".to_string(),
            ));
        }
        if self.lock_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "lockPollIntervalMs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn history_debounce(&self) -> Duration {
        Duration::from_millis(self.history_debounce_ms)
    }

    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    pub fn saved_indicator(&self) -> Duration {
        Duration::from_millis(self.saved_indicator_ms)
    }

    pub fn lock_poll_interval(&self) -> Duration {
        Duration::from_millis(self.lock_poll_interval_ms)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            history_debounce_ms: default_history_debounce_ms(),
            autosave_debounce_ms: default_autosave_debounce_ms(),
            saved_indicator_ms: default_saved_indicator_ms(),
            lock_poll_interval_ms: default_lock_poll_interval_ms(),
            autosave_only_drafts: true,
            seo: GateConfig::default(),
        }
    }
}
