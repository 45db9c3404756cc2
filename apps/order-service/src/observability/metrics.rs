//! Prometheus metrics for the order service.
//!
//! Counters for the order lifecycle, market oracle calls and the circuit
//! breaker. Recording is a no-op until a recorder is installed with
//! [`init_metrics`].

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Configuration for the metrics exporter.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Address to bind the metrics HTTP listener.
    pub listen_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 9091)),
        }
    }
}

impl MetricsConfig {
    /// Create a new metrics configuration with custom address.
    #[must_use]
    pub const fn with_addr(addr: SocketAddr) -> Self {
        Self { listen_addr: addr }
    }
}

/// Initialize the Prometheus metrics exporter.
///
/// Starts an HTTP listener exposing `/metrics`. Must be called from within a
/// tokio runtime.
///
/// # Errors
///
/// Returns an error if the exporter fails to start (e.g., port already in use).
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .install()
        .map_err(|e| MetricsError::Installation(e.to_string()))?;

    tracing::info!(
        addr = %config.listen_addr,
        "Prometheus metrics exporter started"
    );

    Ok(())
}

/// Error type for metrics operations.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Failed to install metrics exporter.
    #[error("metrics installation error: {0}")]
    Installation(String),
}

// ============================================================================
// Order Lifecycle Metrics
// ============================================================================

/// Record a successfully created order.
pub fn record_order_created(order_type: &str) {
    counter!(
        "orders_created_total",
        "order_type" => order_type.to_string()
    )
    .increment(1);
}

/// Record a successfully cancelled order.
pub fn record_order_cancelled() {
    counter!("orders_cancelled_total").increment(1);
}

/// Record a failed orchestrator request.
///
/// # Arguments
///
/// * `operation` - `create`, `get`, `cancel` or `list`
/// * `code` - Error code reason (e.g. `ACCESS_DENIED`)
pub fn record_request_failed(operation: &'static str, code: &'static str) {
    counter!(
        "order_requests_failed_total",
        "operation" => operation,
        "code" => code
    )
    .increment(1);
}

// ============================================================================
// Market Oracle Metrics
// ============================================================================

/// Record a market oracle call.
///
/// # Arguments
///
/// * `outcome` - `exists`, `absent`, or the error label
pub fn record_market_oracle_call(outcome: &'static str) {
    counter!(
        "market_oracle_calls_total",
        "outcome" => outcome
    )
    .increment(1);
}

// ============================================================================
// Circuit Breaker Metrics
// ============================================================================

/// Circuit breaker state values for metrics.
pub mod circuit_breaker_state {
    /// Circuit is closed (healthy).
    pub const CLOSED: f64 = 0.0;
    /// Circuit is open (failing).
    pub const OPEN: f64 = 1.0;
    /// Circuit is half-open (testing).
    pub const HALF_OPEN: f64 = 2.0;
}

/// Update circuit breaker state gauge.
pub fn record_circuit_breaker_state(service: &str, state: f64) {
    gauge!(
        "circuit_breaker_state",
        "service" => service.to_string()
    )
    .set(state);
}

/// Record a call rejected because the circuit is open.
pub fn record_circuit_breaker_rejected(service: &str) {
    counter!(
        "circuit_breaker_rejected_total",
        "service" => service.to_string()
    )
    .increment(1);
}
