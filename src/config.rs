//! Configuration file loading for the `nominatim` binary.
//!
//! Configuration is loaded from a TOML file with the following resolution order:
//! 1. `--config <path>` (CLI flag, must exist)
//! 2. `<config dir>/nominatim-cli/config.toml` (e.g. `~/.config/...` on Linux)
//! 3. built-in defaults
//!
//! Command-line flags are applied on top by the binary.
//!
//! ```toml
//! [service]
//! base_url = "https://nominatim.example.org"
//! email = "ops@example.org"
//!
//! [cache]
//! ttl_ms = 60000
//!
//! [rate_limit]
//! limit = 5
//! interval_ms = 1000
//!
//! [retry]
//! enabled = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheConfig;
use crate::pipeline::PipelineConfig;
use crate::transport::{DEFAULT_BASE_URL, RateLimitConfig, RetryConfig};
use crate::types::OutputFormat;
use crate::{GeocodeError, Result};

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub service: ServiceConfig,
    pub cache: CacheSection,
    pub rate_limit: RateLimitSection,
    pub retry: RetrySection,
}

/// Upstream service settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Service base URL (default: the public OpenStreetMap instance).
    pub base_url: String,
    /// `User-Agent` header; defaults to `nominatim-cli/<version>`.
    pub user_agent: Option<String>,
    /// Contact address sent with each request, as the usage policy asks for bulk users.
    pub email: Option<String>,
    /// Preferred result language(s), e.g. `"de,en"`.
    pub accept_language: Option<String>,
    /// Output format used when `--format` is not given.
    pub format: OutputFormat,
    /// Request timeout in seconds (default: 30, must be non-zero).
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: None,
            email: None,
            accept_language: None,
            format: OutputFormat::default(),
            timeout_secs: 30,
        }
    }
}

/// `[cache]` section, durations in milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSection {
    pub enabled: bool,
    pub ttl_ms: u64,
    pub max_entries: usize,
}

impl Default for CacheSection {
    fn default() -> Self {
        let defaults = CacheConfig::default();
        Self {
            enabled: defaults.enabled,
            ttl_ms: defaults.ttl.as_millis() as u64,
            max_entries: defaults.max_entries,
        }
    }
}

/// `[rate_limit]` section, durations in milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateLimitSection {
    pub enabled: bool,
    pub limit: u32,
    pub interval_ms: u64,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        let defaults = RateLimitConfig::default();
        Self {
            enabled: defaults.enabled,
            limit: defaults.limit,
            interval_ms: defaults.interval.as_millis() as u64,
        }
    }
}

/// `[retry]` section, durations in milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySection {
    pub enabled: bool,
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        let defaults = RetryConfig::default();
        Self {
            enabled: defaults.enabled,
            max_attempts: defaults.max_attempts,
            initial_delay_ms: defaults.initial_delay.as_millis() as u64,
        }
    }
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path must exist. Without one, the user config file is
    /// used if present, otherwise defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Read and parse one config file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GeocodeError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            GeocodeError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })?;
        if config.service.timeout_secs == 0 {
            return Err(GeocodeError::Configuration(format!(
                "Invalid config file {path:?}: service.timeout_secs must be greater than 0"
            )));
        }
        Ok(config)
    }

    /// Path of the per-user config file, if the platform has a config dir.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("nominatim-cli").join("config.toml"))
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(GeocodeError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        Ok(Self::user_config_path().filter(|p| p.exists()))
    }

    /// Pipeline settings described by this file.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            cache: CacheConfig {
                enabled: self.cache.enabled,
                max_entries: self.cache.max_entries,
                ttl: Duration::from_millis(self.cache.ttl_ms),
            },
            rate_limit: RateLimitConfig {
                enabled: self.rate_limit.enabled,
                limit: self.rate_limit.limit,
                interval: Duration::from_millis(self.rate_limit.interval_ms),
            },
            retry: RetryConfig {
                enabled: self.retry.enabled,
                max_attempts: self.retry.max_attempts,
                initial_delay: Duration::from_millis(self.retry.initial_delay_ms),
            },
        }
    }
}
