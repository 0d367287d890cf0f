//! Runtime configuration: TOML file plus environment overrides.

use crate::providers::openai::DEFAULT_BASE_URL;
use crate::reply::RetryPolicy;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PROVIDER_URL: &str = "LLM_PROVIDER_URL";
pub const ENV_PROVIDER_API_KEY: &str = "LLM_PROVIDER_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Longest accepted non-chat reply, in characters.
    pub max_length: usize,
    /// Policy violations tolerated before the fallback model takes over.
    pub ban_threshold: u32,
    /// Cap on regenerations per reply; unset means retry until accepted.
    pub max_attempts: Option<u32>,
    /// Wall-clock budget for one whole generation.
    pub deadline_secs: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_length: policy.max_length,
            ban_threshold: policy.ban_threshold,
            max_attempts: policy.max_attempts,
            deadline_secs: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservabilityBackend {
    None,
    #[default]
    Log,
    Prometheus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub backend: ObservabilityBackend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the persona array; `~` and `$VARS` are expanded.
    pub characters_path: String,
    pub provider: ProviderConfig,
    pub generation: GenerationConfig,
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            characters_path: "characters.json".to_string(),
            provider: ProviderConfig::default(),
            generation: GenerationConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// `<config dir>/replyguy/config.toml` for the current platform.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "replyguy").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("invalid config TOML")
    }

    /// Load from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    /// Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::read(&path)?,
                _ => {
                    tracing::debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("in {}", path.display()))
    }

    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_PROVIDER_URL).filter(|v| !v.is_empty()) {
            self.provider.base_url = url;
        }
        if let Some(key) = lookup(ENV_PROVIDER_API_KEY).filter(|v| !v.is_empty()) {
            self.provider.api_key = key;
        }
    }

    pub fn characters_path(&self) -> Result<PathBuf> {
        let expanded = shellexpand::full(&self.characters_path)
            .with_context(|| format!("cannot expand characters path {}", self.characters_path))?;
        Ok(PathBuf::from(expanded.as_ref()))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_length: self.generation.max_length,
            ban_threshold: self.generation.ban_threshold,
            max_attempts: self.generation.max_attempts,
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.generation.deadline_secs.map(Duration::from_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }
}
