//! Observability module.
//!
//! Prometheus metrics for the order service. Log output is configured in
//! [`crate::telemetry`].

mod metrics;

pub use metrics::{
    MetricsConfig, MetricsError, circuit_breaker_state, init_metrics,
    record_circuit_breaker_rejected, record_circuit_breaker_state, record_market_oracle_call,
    record_order_cancelled, record_order_created, record_request_failed,
};
