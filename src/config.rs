//! Configuration file support
//!
//! Search order:
//! 1. Explicit path (`--config` CLI flag)
//! 2. `leaderboard.config.json` in the working directory
//! 3. `commit-leaderboard/config.json` under the user config directory
//!
//! All fields are optional. CLI flags take precedence over config file values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ConfigError;

const LOCAL_CONFIG_FILE: &str = "leaderboard.config.json";
const USER_CONFIG_DIR: &str = "commit-leaderboard";
const USER_CONFIG_FILE: &str = "config.json";

/// Environment variable read when no API key is configured.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Default location of the curated contribution dataset.
pub const DEFAULT_MANUAL_CONTRIBUTIONS: &str = "manual-contributions.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeaderboardConfig {
    /// Path of the curated contribution dataset
    #[serde(default)]
    pub manual_contributions: Option<PathBuf>,

    /// Number of parallel classification workers
    #[serde(default)]
    pub workers: Option<usize>,

    /// Impact scoring service settings
    #[serde(default)]
    pub impact: ImpactSettings,
}

/// Connection settings for the remote impact scoring service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImpactSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub anthropic_version: String,
}

impl Default for ImpactSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.anthropic.com/v1/messages".to_string(),
            model: "claude-3-5-sonnet-20241022".to_string(),
            api_key: None,
            max_tokens: 10,
            anthropic_version: "2023-06-01".to_string(),
        }
    }
}

impl LeaderboardConfig {
    /// Locate and load the configuration.
    ///
    /// Returns the default configuration when no file is found. An explicit
    /// path that does not exist is an error.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load(path);
        }

        let candidates = std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE)).chain(
            dirs::config_dir().map(|dir| dir.join(USER_CONFIG_DIR).join(USER_CONFIG_FILE)),
        );
        for candidate in candidates {
            if candidate.is_file() {
                return Self::load(&candidate);
            }
        }

        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Dataset path: CLI flag, then config, then the default file name.
    pub fn manual_contributions_path(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| self.manual_contributions.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MANUAL_CONTRIBUTIONS))
    }

    /// API key: CLI flag, then config, then [`API_KEY_ENV`]. Empty values count as unset.
    pub fn resolve_api_key(&self, cli: Option<String>) -> Option<String> {
        cli.or_else(|| self.impact.api_key.clone())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(default_worker_count).max(1)
    }
}

/// Use 75% of available CPUs to leave room for other system processes
fn default_worker_count() -> usize {
    (num_cpus::get() * 3 / 4).max(1)
}
