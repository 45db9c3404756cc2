//! Server configuration for the HTTP endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// HTTP port for `/health` and `/api/v1/*`.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Grace period for in-flight requests on shutdown (seconds).
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    /// `bind_address:http_port`.
    #[must_use]
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.http_port)
    }

    /// Shutdown grace period.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            http_port: default_http_port(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

/// Health endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Serve `GET /health`.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

pub(crate) const fn default_http_port() -> u16 {
    50061
}

const fn default_shutdown_timeout_secs() -> u64 {
    10
}

pub(crate) const fn default_true() -> bool {
    true
}
