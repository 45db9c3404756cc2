//! Order status in the lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::order_management::errors::OrderError;

/// Lifecycle status of an order.
///
/// ```text
/// UNSPECIFIED -> CREATED -> OPEN -> { FILLED, CANCELLED, REJECTED }
///                CREATED -> CANCELLED
/// ```
///
/// `FILLED`, `CANCELLED` and `REJECTED` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Not yet assigned; never stored.
    #[default]
    Unspecified,
    /// Accepted by the service, not yet working in a market.
    Created,
    /// Working in the market.
    Open,
    /// Completely filled.
    Filled,
    /// Cancelled by its owner.
    Cancelled,
    /// Rejected downstream.
    Rejected,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Unspecified,
        Self::Created,
        Self::Open,
        Self::Filled,
        Self::Cancelled,
        Self::Rejected,
    ];

    /// Returns true if no further transition is permitted.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled | Self::Rejected)
    }

    /// Returns true if the order may move to `CANCELLED`.
    #[must_use]
    pub const fn is_cancelable(&self) -> bool {
        matches!(self, Self::Created | Self::Open)
    }

    /// Wire token for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "UNSPECIFIED",
            Self::Created => "CREATED",
            Self::Open => "OPEN",
            Self::Filled => "FILLED",
            Self::Cancelled => "CANCELLED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNSPECIFIED" => Ok(Self::Unspecified),
            "CREATED" => Ok(Self::Created),
            "OPEN" => Ok(Self::Open),
            "FILLED" => Ok(Self::Filled),
            "CANCELLED" => Ok(Self::Cancelled),
            "REJECTED" => Ok(Self::Rejected),
            _ => Err(OrderError::InvalidOrderStatus {
                token: s.to_string(),
            }),
        }
    }
}
