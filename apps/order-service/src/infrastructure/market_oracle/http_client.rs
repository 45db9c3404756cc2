//! HTTP client for the market service.
//!
//! Asks `GET {base_url}/v1/markets?roles=COMMON,VERIFIED` for the markets
//! visible to the given roles and checks whether the requested id is among
//! the enabled ones.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::application::context::RequestContext;
use crate::application::ports::{MarketOracleError, MarketOraclePort, UserRole};
use crate::config::MarketOracleConfig;
use crate::domain::shared::MarketId;

const MARKETS_PATH: &str = "/v1/markets";

/// Market entry as returned by the market service.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketEntry {
    /// Market id (e.g. `BTC-USDT`).
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Whether the market currently accepts orders.
    #[serde(default)]
    pub enabled: bool,
}

/// Response body of the markets listing.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketsResponse {
    /// Markets visible to the requested roles.
    #[serde(default)]
    pub markets: Vec<MarketEntry>,
}

impl MarketsResponse {
    /// True if `market_id` is listed and enabled.
    #[must_use]
    pub fn contains_enabled(&self, market_id: &MarketId) -> bool {
        self.markets
            .iter()
            .any(|m| m.enabled && m.id == market_id.as_str())
    }
}

/// Market oracle backed by the market service HTTP API.
#[derive(Debug, Clone)]
pub struct HttpMarketOracle {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpMarketOracle {
    /// Create a client from config.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the underlying HTTP client cannot be built.
    pub fn new(config: &MarketOracleConfig) -> Result<Self, MarketOracleError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| MarketOracleError::Unavailable {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
        })
    }

    /// Base URL the client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configured timeout, shortened to the context's remaining time.
    fn effective_timeout(&self, ctx: &RequestContext) -> Duration {
        ctx.remaining()
            .map_or(self.timeout, |remaining| remaining.min(self.timeout))
    }

    async fn fetch_markets(&self, roles: &[UserRole]) -> Result<MarketsResponse, MarketOracleError> {
        let url = format!("{}{MARKETS_PATH}", self.base_url);
        let roles = roles
            .iter()
            .map(UserRole::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let response = self
            .client
            .get(&url)
            .query(&[("roles", roles.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketOracleError::Timeout
                } else {
                    MarketOracleError::Unavailable {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketOracleError::Unavailable {
                message: format!("market service returned {}: {body}", status.as_u16()),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| MarketOracleError::Unavailable {
                message: e.to_string(),
            })?;

        serde_json::from_str(&text).map_err(|e| MarketOracleError::InvalidResponse {
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl MarketOraclePort for HttpMarketOracle {
    async fn market_exists(
        &self,
        ctx: &RequestContext,
        market_id: &MarketId,
        roles: &[UserRole],
    ) -> Result<bool, MarketOracleError> {
        if ctx.is_cancelled() {
            return Err(MarketOracleError::Cancelled);
        }
        let timeout = self.effective_timeout(ctx);
        if timeout.is_zero() {
            return Err(MarketOracleError::Timeout);
        }

        let markets = tokio::select! {
            () = ctx.cancellation().cancelled() => return Err(MarketOracleError::Cancelled),
            result = tokio::time::timeout(timeout, self.fetch_markets(roles)) => {
                result.map_err(|_| MarketOracleError::Timeout)??
            }
        };

        let exists = markets.contains_enabled(market_id);
        tracing::debug!(
            trace_id = %ctx.trace_id(),
            market_id = %market_id,
            listed = markets.markets.len(),
            exists,
            "Market oracle answered"
        );
        Ok(exists)
    }
}
