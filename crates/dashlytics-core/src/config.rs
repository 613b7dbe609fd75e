//! `Dashlytics` Configuration Module
//!
//! Provides configuration file support via `dashlytics.toml`, environment
//! variables, and runtime overrides.
//!
//! # Priority (highest to lowest)
//!
//! 1. Runtime overrides (CLI flags)
//! 2. Environment variables (`DASHLYTICS_*`)
//! 3. Configuration file (`dashlytics.toml`)
//! 4. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },
}

/// Result cache configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL applied when a caller does not pass one, in milliseconds.
    pub default_ttl_ms: u64,
    /// Period of the background sweep, in milliseconds.
    pub sweep_interval_ms: u64,
    /// Maximum number of stored entries.
    pub max_entries: usize,
    /// Serialize concurrent misses on the same key.
    pub single_flight: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_ms: 300_000,   // 5 minutes
            sweep_interval_ms: 60_000, // 1 minute
            max_entries: 10_000,
            single_flight: true,
        }
    }
}

impl CacheConfig {
    /// Default TTL as a `Duration`.
    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    /// Sweep period as a `Duration`.
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

/// Engine configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Moving-average window used when a request does not specify one.
    pub default_moving_average_window: usize,
    /// Maximum records accepted in a single request.
    pub max_records: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_moving_average_window: 7,
            max_records: 1_000_000,
        }
    }
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address.
    pub host: String,
    /// Port number.
    pub port: u16,
    /// Enable permissive CORS.
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_enabled: true,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace.
    pub level: String,
    /// Log format: text or json.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Main `Dashlytics` configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DashConfig {
    /// Result cache configuration.
    pub cache: CacheConfig,
    /// Engine configuration.
    pub engine: EngineConfig,
    /// Server configuration.
    pub server: ServerConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl DashConfig {
    /// Loads configuration from default sources.
    ///
    /// Priority: defaults < file < environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("dashlytics.toml")
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    /// Environment keys use `__` between section and field, e.g.
    /// `DASHLYTICS_CACHE__DEFAULT_TTL_MS`.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("DASHLYTICS_").split("__"));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Creates a configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml_str));

        figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.default_ttl_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "cache.default_ttl_ms".to_string(),
                message: "value must be > 0".to_string(),
            });
        }

        if self.cache.sweep_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "cache.sweep_interval_ms".to_string(),
                message: "value must be > 0".to_string(),
            });
        }

        if self.cache.max_entries == 0 {
            return Err(ConfigError::InvalidValue {
                key: "cache.max_entries".to_string(),
                message: "value must be > 0".to_string(),
            });
        }

        if self.engine.default_moving_average_window == 0 {
            return Err(ConfigError::InvalidValue {
                key: "engine.default_moving_average_window".to_string(),
                message: "value must be > 0".to_string(),
            });
        }

        if self.engine.max_records == 0 {
            return Err(ConfigError::InvalidValue {
                key: "engine.max_records".to_string(),
                message: "value must be > 0".to_string(),
            });
        }

        if self.server.port < 1024 {
            return Err(ConfigError::InvalidValue {
                key: "server.port".to_string(),
                message: format!("value {} must be >= 1024", self.server.port),
            });
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "logging.format".to_string(),
                message: format!(
                    "value '{}' is invalid, expected one of: {:?}",
                    self.logging.format, valid_formats
                ),
            });
        }

        Ok(())
    }

    /// Serializes the configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}
