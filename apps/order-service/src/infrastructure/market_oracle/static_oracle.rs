//! Fixed-set market oracle for local development and tests.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::application::context::RequestContext;
use crate::application::ports::{MarketOracleError, MarketOraclePort, UserRole};
use crate::domain::shared::MarketId;

/// Oracle that knows a fixed set of markets, visible to every role.
#[derive(Debug, Clone, Default)]
pub struct StaticMarketOracle {
    markets: HashSet<MarketId>,
}

impl StaticMarketOracle {
    /// Create an oracle knowing `markets`.
    pub fn new<I, S>(markets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<MarketId>,
    {
        Self {
            markets: markets.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of known markets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markets.len()
    }

    /// True if no markets are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}

#[async_trait]
impl MarketOraclePort for StaticMarketOracle {
    async fn market_exists(
        &self,
        ctx: &RequestContext,
        market_id: &MarketId,
        _roles: &[UserRole],
    ) -> Result<bool, MarketOracleError> {
        if ctx.is_cancelled() {
            return Err(MarketOracleError::Cancelled);
        }
        if ctx.is_expired() {
            return Err(MarketOracleError::Timeout);
        }
        Ok(self.markets.contains(market_id))
    }
}
