//! Dependency Injection Container
//!
//! Wires the order store, the market oracle and the role provider into one
//! [`OrderOrchestrator`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::context::RequestContext;
use crate::application::ports::{
    DefaultRoleProvider, MarketOracleError, MarketOraclePort, RoleProviderPort, UserRole,
};
use crate::application::services::OrderOrchestrator;
use crate::config::MarketOracleConfig;
use crate::domain::order_management::OrderRepository;
use crate::domain::shared::MarketId;
use crate::infrastructure::market_oracle::{
    CircuitBreakingMarketOracle, HttpMarketOracle, StaticMarketOracle,
};
use crate::infrastructure::persistence::InMemoryOrderRepository;
use crate::resilience::CircuitBreaker;

/// Name of the breaker guarding the market oracle.
pub const MARKET_ORACLE_BREAKER: &str = "market-oracle";

/// Dependency injection container.
///
/// Holds the wired ports and the orchestrator built on top of them.
pub struct Container<R, M, P>
where
    R: OrderRepository + 'static,
    M: MarketOraclePort + 'static,
    P: RoleProviderPort + 'static,
{
    order_repo: Arc<R>,
    market_oracle: Arc<M>,
    role_provider: Arc<P>,
    orchestrator: Arc<OrderOrchestrator<R, M, P>>,
}

impl<R, M, P> Container<R, M, P>
where
    R: OrderRepository + 'static,
    M: MarketOraclePort + 'static,
    P: RoleProviderPort + 'static,
{
    /// Create a new container with all dependencies.
    pub fn new(order_repo: Arc<R>, market_oracle: Arc<M>, role_provider: Arc<P>) -> Self {
        let orchestrator = Arc::new(OrderOrchestrator::new(
            Arc::clone(&order_repo),
            Arc::clone(&market_oracle),
            Arc::clone(&role_provider),
        ));
        Self {
            order_repo,
            market_oracle,
            role_provider,
            orchestrator,
        }
    }

    /// Get the order store.
    pub fn order_repo(&self) -> Arc<R> {
        Arc::clone(&self.order_repo)
    }

    /// Get the market oracle.
    pub fn market_oracle(&self) -> Arc<M> {
        Arc::clone(&self.market_oracle)
    }

    /// Get the role provider.
    pub fn role_provider(&self) -> Arc<P> {
        Arc::clone(&self.role_provider)
    }

    /// Get the orchestrator.
    pub fn orchestrator(&self) -> Arc<OrderOrchestrator<R, M, P>> {
        Arc::clone(&self.orchestrator)
    }
}

/// Market oracle selected at startup.
#[derive(Debug)]
pub enum MarketOracleAdapter {
    /// Plain HTTP client.
    Http(HttpMarketOracle),
    /// HTTP client behind a circuit breaker.
    Guarded(CircuitBreakingMarketOracle<HttpMarketOracle>),
    /// Fixed market set.
    Static(StaticMarketOracle),
}

impl MarketOracleAdapter {
    /// Build the HTTP oracle described by `config`, wrapped in a breaker when
    /// `enable_breaker` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &MarketOracleConfig) -> Result<Self, MarketOracleError> {
        let client = HttpMarketOracle::new(config)?;
        if !config.enable_breaker {
            return Ok(Self::Http(client));
        }

        let breaker = Arc::new(CircuitBreaker::new(
            MARKET_ORACLE_BREAKER,
            config.circuit_breaker.to_resilience_config(),
        ));
        Ok(Self::Guarded(CircuitBreakingMarketOracle::new(client, breaker)))
    }

    /// The breaker in front of the oracle, if any.
    #[must_use]
    pub const fn breaker(&self) -> Option<&Arc<CircuitBreaker>> {
        match self {
            Self::Guarded(oracle) => Some(oracle.breaker()),
            Self::Http(_) | Self::Static(_) => None,
        }
    }
}

#[async_trait]
impl MarketOraclePort for MarketOracleAdapter {
    async fn market_exists(
        &self,
        ctx: &RequestContext,
        market_id: &MarketId,
        roles: &[UserRole],
    ) -> Result<bool, MarketOracleError> {
        match self {
            Self::Http(oracle) => oracle.market_exists(ctx, market_id, roles).await,
            Self::Guarded(oracle) => oracle.market_exists(ctx, market_id, roles).await,
            Self::Static(oracle) => oracle.market_exists(ctx, market_id, roles).await,
        }
    }
}

/// Container used by the service binary.
pub type ServiceContainer = Container<InMemoryOrderRepository, MarketOracleAdapter, DefaultRoleProvider>;

impl ServiceContainer {
    /// Wire the production graph: in-memory store, configured oracle and
    /// the default role provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the market oracle client cannot be built.
    pub fn from_config(config: &MarketOracleConfig) -> Result<Self, MarketOracleError> {
        Ok(Self::with_oracle(MarketOracleAdapter::from_config(config)?))
    }

    /// Wire the production graph around an explicit oracle.
    #[must_use]
    pub fn with_oracle(oracle: MarketOracleAdapter) -> Self {
        Self::new(
            Arc::new(InMemoryOrderRepository::new()),
            Arc::new(oracle),
            Arc::new(DefaultRoleProvider),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::CreateOrderRequest;
    use crate::resilience::CircuitBreakerState;
    use rust_decimal_macros::dec;

    #[test]
    fn breaker_follows_config() {
        let guarded = MarketOracleAdapter::from_config(&MarketOracleConfig::default()).unwrap();
        let breaker = guarded.breaker().unwrap();
        assert_eq!(breaker.name(), MARKET_ORACLE_BREAKER);
        assert_eq!(breaker.state(), CircuitBreakerState::Closed);

        let plain = MarketOracleAdapter::from_config(&MarketOracleConfig {
            enable_breaker: false,
            ..MarketOracleConfig::default()
        })
        .unwrap();
        assert!(plain.breaker().is_none());
    }

    #[tokio::test]
    async fn container_shares_one_store() {
        let container = ServiceContainer::with_oracle(MarketOracleAdapter::Static(
            StaticMarketOracle::new(["BTC-USDT"]),
        ));

        container
            .orchestrator()
            .create_order(
                &RequestContext::background(),
                CreateOrderRequest {
                    user_id: "u1".to_string(),
                    market_id: "BTC-USDT".to_string(),
                    order_type: "LIMIT".to_string(),
                    price: dec!(100),
                    quantity: dec!(1),
                },
            )
            .await
            .unwrap();

        assert_eq!(container.order_repo().count().await.unwrap(), 1);
    }
}
