//! Order type (limit, market, stop variants).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::order_management::errors::OrderError;

/// Order type as requested by the client.
///
/// Informational only: the service attaches no matching semantics to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// No type supplied. Never accepted on create.
    #[default]
    Unspecified,
    /// Limit order.
    Limit,
    /// Market order.
    Market,
    /// Stop-limit order.
    StopLimit,
    /// Stop-market order.
    StopMarket,
}

impl OrderType {
    /// Wire token for this type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "UNSPECIFIED",
            Self::Limit => "LIMIT",
            Self::Market => "MARKET",
            Self::StopLimit => "STOP_LIMIT",
            Self::StopMarket => "STOP_MARKET",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = OrderError;

    /// Parse a client-supplied token. `UNSPECIFIED` is rejected like any
    /// unknown token.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LIMIT" => Ok(Self::Limit),
            "MARKET" => Ok(Self::Market),
            "STOP_LIMIT" => Ok(Self::StopLimit),
            "STOP_MARKET" => Ok(Self::StopMarket),
            _ => Err(OrderError::InvalidOrderType {
                token: s.to_string(),
            }),
        }
    }
}
