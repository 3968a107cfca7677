use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::constants::DEFAULT_BASE_URL;
use crate::error::{Result, TrackerError};
use crate::pipeline::processing::alias::AliasTables;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const BASE_URL_ENV: &str = "COVID_API_BASE_URL";
pub const TIMEOUT_ENV: &str = "COVID_API_TIMEOUT_SECONDS";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub aliases: AliasConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Extra alias entries layered over the built-in tables
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AliasConfig {
    #[serde(default)]
    pub time_series_to_snapshot: HashMap<String, String>,
    #[serde(default)]
    pub snapshot_to_time_series: HashMap<String, String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Config {
    /// Load `config.toml` from the working directory (defaults if absent), then apply env overrides
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let config_content = fs::read_to_string(path).map_err(|e| {
                TrackerError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
            })?;
            let config: Config = toml::from_str(&config_content)?;
            info!("Loaded configuration from {}", path.display());
            config
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Config::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in `load`)
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            self.api.base_url = base_url;
        }
        if let Some(timeout) = lookup(TIMEOUT_ENV) {
            self.api.timeout_seconds = timeout.trim().parse().map_err(|_| {
                TrackerError::Config(format!("{} must be a whole number of seconds, got '{}'", TIMEOUT_ENV, timeout))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let base = self.api.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(TrackerError::Config(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if self.api.timeout_seconds == 0 {
            return Err(TrackerError::Config("api.timeout_seconds must be positive".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    /// Built-in alias tables with this config's entries layered on top
    pub fn alias_tables(&self) -> AliasTables {
        AliasTables::builtin().with_overrides(
            &self.aliases.time_series_to_snapshot,
            &self.aliases.snapshot_to_time_series,
        )
    }
}
