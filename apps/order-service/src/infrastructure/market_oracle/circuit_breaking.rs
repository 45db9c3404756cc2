//! Circuit-breaking decorator for any market oracle.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::context::RequestContext;
use crate::application::ports::{MarketOracleError, MarketOraclePort, UserRole};
use crate::domain::shared::MarketId;
use crate::resilience::CircuitBreaker;

/// Wraps an oracle with a [`CircuitBreaker`].
///
/// While the circuit is open calls fail with `CircuitOpen` and never reach
/// the inner oracle. A definitive answer, positive or negative, counts as a
/// success. Caller cancellation records nothing and frees the trial slot;
/// every other inner error counts as a failure.
pub struct CircuitBreakingMarketOracle<O> {
    inner: O,
    breaker: Arc<CircuitBreaker>,
}

impl<O> CircuitBreakingMarketOracle<O> {
    /// Wrap `inner` with `breaker`.
    pub const fn new(inner: O, breaker: Arc<CircuitBreaker>) -> Self {
        Self { inner, breaker }
    }

    /// The breaker guarding the inner oracle.
    pub const fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }
}

impl<O> std::fmt::Debug for CircuitBreakingMarketOracle<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreakingMarketOracle")
            .field("breaker", &self.breaker.name())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<O: MarketOraclePort> MarketOraclePort for CircuitBreakingMarketOracle<O> {
    async fn market_exists(
        &self,
        ctx: &RequestContext,
        market_id: &MarketId,
        roles: &[UserRole],
    ) -> Result<bool, MarketOracleError> {
        let Some(permit) = self.breaker.try_acquire() else {
            return Err(MarketOracleError::CircuitOpen {
                name: self.breaker.name().to_string(),
            });
        };

        let result = self.inner.market_exists(ctx, market_id, roles).await;
        match &result {
            Ok(_) => permit.success(),
            Err(MarketOracleError::Cancelled) => drop(permit),
            Err(e) => {
                tracing::debug!(
                    trace_id = %ctx.trace_id(),
                    breaker = %self.breaker.name(),
                    error = %e,
                    "Market oracle call failed"
                );
                permit.failure();
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::resilience::{CircuitBreakerConfig, CircuitBreakerState};

    /// Oracle that always fails and counts how often it was reached.
    #[derive(Default)]
    struct FailingOracle {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MarketOraclePort for FailingOracle {
        async fn market_exists(
            &self,
            _ctx: &RequestContext,
            _market_id: &MarketId,
            _roles: &[UserRole],
        ) -> Result<bool, MarketOracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(MarketOracleError::Unavailable {
                message: "connection refused".to_string(),
            })
        }
    }

    /// Oracle that never answers until the caller gives up.
    struct HangingOracle;

    #[async_trait]
    impl MarketOraclePort for HangingOracle {
        async fn market_exists(
            &self,
            _ctx: &RequestContext,
            _market_id: &MarketId,
            _roles: &[UserRole],
        ) -> Result<bool, MarketOracleError> {
            std::future::pending().await
        }
    }

    /// Oracle whose calls are always cancelled.
    struct CancelledOracle;

    #[async_trait]
    impl MarketOraclePort for CancelledOracle {
        async fn market_exists(
            &self,
            _ctx: &RequestContext,
            _market_id: &MarketId,
            _roles: &[UserRole],
        ) -> Result<bool, MarketOracleError> {
            Err(MarketOracleError::Cancelled)
        }
    }

    fn half_open_breaker() -> Arc<CircuitBreaker> {
        let breaker = Arc::new(CircuitBreaker::new(
            "market-oracle",
            CircuitBreakerConfig {
                failure_rate_threshold: 0.5,
                sliding_window_size: 4,
                minimum_calls: 2,
                wait_duration_in_open: Duration::from_millis(10),
                permitted_calls_in_half_open: 1,
            },
        ));
        breaker.force_open();
        breaker
    }

    fn breaker() -> Arc<CircuitBreaker> {
        Arc::new(CircuitBreaker::new(
            "market-oracle",
            CircuitBreakerConfig {
                failure_rate_threshold: 0.5,
                sliding_window_size: 4,
                minimum_calls: 2,
                wait_duration_in_open: Duration::from_secs(60),
                permitted_calls_in_half_open: 1,
            },
        ))
    }

    #[tokio::test]
    async fn open_circuit_short_circuits_inner_oracle() {
        let oracle = CircuitBreakingMarketOracle::new(FailingOracle::default(), breaker());
        let ctx = RequestContext::background();
        let market = MarketId::new("BTC-USDT");

        for _ in 0..2 {
            let err = oracle
                .market_exists(&ctx, &market, &[UserRole::Common])
                .await
                .unwrap_err();
            assert_eq!(err.label(), "unavailable");
        }
        assert_eq!(oracle.breaker().state(), CircuitBreakerState::Open);

        let err = oracle
            .market_exists(&ctx, &market, &[UserRole::Common])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            MarketOracleError::CircuitOpen {
                name: "market-oracle".to_string()
            }
        );
        assert_eq!(oracle.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn negative_answer_counts_as_success() {
        let inner = crate::infrastructure::market_oracle::StaticMarketOracle::new(["ETH-USDT"]);
        let oracle = CircuitBreakingMarketOracle::new(inner, breaker());
        let ctx = RequestContext::background();

        for _ in 0..5 {
            let exists = oracle
                .market_exists(&ctx, &MarketId::new("BTC-USDT"), &[UserRole::Common])
                .await
                .unwrap();
            assert!(!exists);
        }

        let metrics = oracle.breaker().metrics();
        assert_eq!(metrics.state, CircuitBreakerState::Closed);
        assert_eq!(metrics.total_failures, 0);
    }

    #[tokio::test]
    async fn dropped_call_frees_half_open_slot() {
        let breaker = half_open_breaker();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(breaker.state(), CircuitBreakerState::HalfOpen);

        let ctx = RequestContext::background();
        let market = MarketId::new("BTC-USDT");

        let hanging = CircuitBreakingMarketOracle::new(HangingOracle, Arc::clone(&breaker));
        let abandoned = tokio::time::timeout(
            Duration::from_millis(5),
            hanging.market_exists(&ctx, &market, &[UserRole::Common]),
        )
        .await;
        assert!(abandoned.is_err());

        let inner = crate::infrastructure::market_oracle::StaticMarketOracle::new(["BTC-USDT"]);
        let oracle = CircuitBreakingMarketOracle::new(inner, Arc::clone(&breaker));
        let exists = oracle
            .market_exists(&ctx, &market, &[UserRole::Common])
            .await
            .unwrap();
        assert!(exists);
        assert_eq!(breaker.state(), CircuitBreakerState::Closed);
    }

    #[tokio::test]
    async fn cancellation_is_not_a_failure() {
        let oracle = CircuitBreakingMarketOracle::new(CancelledOracle, breaker());
        let ctx = RequestContext::background();
        let market = MarketId::new("BTC-USDT");

        for _ in 0..4 {
            let err = oracle
                .market_exists(&ctx, &market, &[UserRole::Common])
                .await
                .unwrap_err();
            assert_eq!(err, MarketOracleError::Cancelled);
        }

        let metrics = oracle.breaker().metrics();
        assert_eq!(metrics.state, CircuitBreakerState::Closed);
        assert_eq!(metrics.total_failures, 0);
    }
}
