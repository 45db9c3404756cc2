//! Market oracle client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::server::default_true;

/// Market oracle configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketOracleConfig {
    /// Base URL of the market service.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-call timeout (milliseconds).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Wrap the client in a circuit breaker.
    #[serde(default = "default_true")]
    pub enable_breaker: bool,
    /// Circuit breaker settings.
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerSettings,
}

impl MarketOracleConfig {
    /// Per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for MarketOracleConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            enable_breaker: true,
            circuit_breaker: CircuitBreakerSettings::default(),
        }
    }
}

/// Circuit breaker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerSettings {
    /// Failure rate threshold to open circuit.
    #[serde(default = "default_failure_rate_threshold")]
    pub failure_rate_threshold: f64,
    /// Sliding window size.
    #[serde(default = "default_sliding_window_size")]
    pub sliding_window_size: u32,
    /// Minimum calls before evaluating.
    #[serde(default = "default_minimum_calls")]
    pub minimum_calls: u32,
    /// Duration in open state (seconds).
    #[serde(default = "default_wait_duration")]
    pub wait_duration_secs: u64,
    /// Calls permitted in half-open state.
    #[serde(default = "default_permitted_calls")]
    pub permitted_calls_in_half_open: u32,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            failure_rate_threshold: default_failure_rate_threshold(),
            sliding_window_size: default_sliding_window_size(),
            minimum_calls: default_minimum_calls(),
            wait_duration_secs: default_wait_duration(),
            permitted_calls_in_half_open: default_permitted_calls(),
        }
    }
}

impl CircuitBreakerSettings {
    /// Convert config settings to the resilience module's config.
    #[must_use]
    pub const fn to_resilience_config(&self) -> crate::resilience::CircuitBreakerConfig {
        crate::resilience::CircuitBreakerConfig {
            failure_rate_threshold: self.failure_rate_threshold,
            sliding_window_size: self.sliding_window_size,
            minimum_calls: self.minimum_calls,
            wait_duration_in_open: Duration::from_secs(self.wait_duration_secs),
            permitted_calls_in_half_open: self.permitted_calls_in_half_open,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:50062".to_string()
}

const fn default_timeout_ms() -> u64 {
    2000
}

const fn default_failure_rate_threshold() -> f64 {
    0.5
}

const fn default_sliding_window_size() -> u32 {
    20
}

const fn default_minimum_calls() -> u32 {
    5
}

const fn default_wait_duration() -> u64 {
    10
}

const fn default_permitted_calls() -> u32 {
    3
}
