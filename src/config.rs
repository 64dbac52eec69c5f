//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. An explicit path (e.g. `forge --config <path>`)
//! 2. `~/.recipe-forge/config.toml` (user)
//! 3. `/etc/recipe-forge/config.toml` (system)
//!
//! The provider API key may live in the file or in the provider's
//! environment variable (`ANTHROPIC_API_KEY` / `OPENAI_API_KEY`); the file
//! wins when both are set.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheConfig;
use crate::limiter::RateLimitConfig;
use crate::providers::{ProviderKind, RetryConfig};
use crate::quality::DEFAULT_THRESHOLD;
use crate::store::DEFAULT_MAX_ENTRIES;
use crate::{ForgeError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForgeConfig {
    /// Hosted provider; absent means fallback-only operation.
    #[serde(default)]
    pub provider: Option<ProviderConfig>,
    #[serde(default)]
    pub features: FeaturesConfig,
    #[serde(default)]
    pub rate_limits: RateLimitsConfig,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub retry: RetrySection,
    #[serde(default)]
    pub quality: QualitySection,
}

/// `[provider]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// "anthropic" or "openai".
    pub kind: ProviderKind,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Per-call timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl ProviderConfig {
    /// API key from the file, else from the provider's environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|var| std::env::var(var).ok())
    }

    /// As [`resolve_api_key`](Self::resolve_api_key), with a custom
    /// environment lookup.
    pub fn resolve_api_key_with(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| env(self.kind.api_key_env()).filter(|key| !key.trim().is_empty()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[features]` table.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default = "enabled")]
    pub cache_enabled: bool,
    #[serde(default = "enabled")]
    pub fallback_enabled: bool,
    #[serde(default = "enabled")]
    pub ai_enabled: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            fallback_enabled: true,
            ai_enabled: true,
        }
    }
}

fn enabled() -> bool {
    true
}

/// `[rate_limits]` table.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RateLimitsConfig {
    #[serde(default = "default_per_minute")]
    pub per_minute: u32,
    #[serde(default = "default_per_hour")]
    pub per_hour: u32,
}

impl Default for RateLimitsConfig {
    fn default() -> Self {
        Self {
            per_minute: default_per_minute(),
            per_hour: default_per_hour(),
        }
    }
}

fn default_per_minute() -> u32 {
    RateLimitConfig::default().per_minute
}

fn default_per_hour() -> u32 {
    RateLimitConfig::default().per_hour
}

impl From<RateLimitsConfig> for RateLimitConfig {
    fn from(section: RateLimitsConfig) -> Self {
        RateLimitConfig::new()
            .per_minute(section.per_minute)
            .per_hour(section.per_hour)
    }
}

/// `[cache]` table.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CacheSection {
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_max_entries() -> u64 {
    DEFAULT_MAX_ENTRIES
}

fn default_ttl_secs() -> u64 {
    3600
}

impl From<CacheSection> for CacheConfig {
    fn from(section: CacheSection) -> Self {
        CacheConfig::new()
            .max_entries(section.max_entries)
            .ttl(Duration::from_secs(section.ttl_secs))
    }
}

/// `[retry]` table. Retries are off unless `max_attempts > 1`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RetrySection {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    1
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10_000
}

impl From<RetrySection> for RetryConfig {
    fn from(section: RetrySection) -> Self {
        RetryConfig::new()
            .max_attempts(section.max_attempts)
            .initial_delay(Duration::from_millis(section.initial_delay_ms))
            .max_delay(Duration::from_millis(section.max_delay_ms))
    }
}

/// `[quality]` table.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct QualitySection {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for QualitySection {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl ForgeConfig {
    /// Load configuration from the standard locations.
    ///
    /// Fails if no file is found or it does not parse.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Err(ForgeError::Configuration(
                "No config file found. Create ~/.recipe-forge/config.toml or /etc/recipe-forge/config.toml"
                    .to_string(),
            )),
        }
    }

    /// Like [`load`](Self::load), but falls back to defaults when no file
    /// exists at the standard locations. An explicit path must still exist.
    pub fn load_or_default(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ForgeError::Configuration(format!("Failed to parse config: {e}")))
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ForgeError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            ForgeError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(ForgeError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".recipe-forge").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/recipe-forge/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }
        Ok(None)
    }
}
