//! Market Oracle Port (Driven Port)
//!
//! Confirms that a market id is valid and accessible for a set of requester
//! roles. A definitive "no" is `Ok(false)`; only failures to obtain an answer
//! are errors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::context::RequestContext;
use crate::domain::shared::MarketId;

/// Requester role, used by the oracle to decide market visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Regular account.
    Common,
    /// Identity-verified account.
    Verified,
    /// Institutional account.
    Institutional,
}

impl UserRole {
    /// Wire token.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "COMMON",
            Self::Verified => "VERIFIED",
            Self::Institutional => "INSTITUTIONAL",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to obtain an answer from the oracle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MarketOracleError {
    /// The call did not complete before its deadline.
    #[error("market oracle call timed out")]
    Timeout,

    /// The caller cancelled the request.
    #[error("market oracle call cancelled")]
    Cancelled,

    /// Transport or upstream failure.
    #[error("market oracle unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// The circuit breaker rejected the call.
    #[error("circuit breaker '{name}' is open")]
    CircuitOpen {
        /// Breaker name.
        name: String,
    },

    /// The oracle answered with something we could not interpret.
    #[error("invalid market oracle response: {message}")]
    InvalidResponse {
        /// Error details.
        message: String,
    },
}

impl MarketOracleError {
    /// Metric/log label for this failure.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::Unavailable { .. } => "unavailable",
            Self::CircuitOpen { .. } => "circuit_open",
            Self::InvalidResponse { .. } => "invalid_response",
        }
    }
}

/// Port for market existence checks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketOraclePort: Send + Sync {
    /// Returns whether `market_id` exists and is accessible to `roles`.
    ///
    /// Implementations must honour the context's deadline and cancellation.
    ///
    /// # Errors
    ///
    /// Returns an error when no definitive answer could be obtained.
    async fn market_exists(
        &self,
        ctx: &RequestContext,
        market_id: &MarketId,
        roles: &[UserRole],
    ) -> Result<bool, MarketOracleError>;
}
