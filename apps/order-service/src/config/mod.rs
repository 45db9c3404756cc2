//! Configuration module for the order service.
//!
//! YAML configuration with `${VAR}` / `${VAR:-default}` environment
//! interpolation. Every section has defaults, so an empty file is valid.
//!
//! # Usage
//!
//! ```rust,ignore
//! use order_service::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Load from custom path
//! let config = load_config(Some("deploy/config.yaml"))?;
//!
//! println!("HTTP port: {}", config.server.http_port);
//! ```

mod market_oracle;
mod observability;
mod server;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use market_oracle::{CircuitBreakerSettings, MarketOracleConfig};
pub use observability::{LoggingConfig, MetricsSettings, ObservabilityConfig};
pub use server::{HealthConfig, ServerConfig};

/// Default config file path.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Market oracle client configuration.
    #[serde(default)]
    pub market_oracle: MarketOracleConfig,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// Health endpoint configuration.
    #[serde(default)]
    pub health: HealthConfig,
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    // An empty document deserializes to unit, not to a map.
    let config: Config = if interpolated.trim().is_empty() {
        Config::default()
    } else {
        serde_yaml_bw::from_str(&interpolated)?
    };
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax. An unset or empty
/// variable without a default becomes the empty string.
#[allow(clippy::expect_used)] // Regex is a literal; it cannot fail to compile.
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let metrics = &config.observability.metrics;
    if metrics.enabled && metrics.port == config.server.http_port {
        return Err(ConfigError::ValidationError(
            "server.http_port and observability.metrics.port must be different".to_string(),
        ));
    }

    if config.market_oracle.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "market_oracle.base_url must not be empty".to_string(),
        ));
    }

    if config.market_oracle.timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "market_oracle.timeout_ms must be positive".to_string(),
        ));
    }

    let cb = &config.market_oracle.circuit_breaker;
    if !(0.0..=1.0).contains(&cb.failure_rate_threshold) {
        return Err(ConfigError::ValidationError(
            "market_oracle.circuit_breaker.failure_rate_threshold must be between 0.0 and 1.0"
                .to_string(),
        ));
    }

    if cb.sliding_window_size == 0 || cb.permitted_calls_in_half_open == 0 {
        return Err(ConfigError::ValidationError(
            "market_oracle.circuit_breaker window and half-open calls must be positive"
                .to_string(),
        ));
    }

    let valid_formats = ["json", "pretty"];
    if !valid_formats.contains(&config.observability.logging.format.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {valid_formats:?}"
        )));
    }

    Ok(())
}
