//! Strictly positive decimal amounts: order price and quantity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::order_management::errors::OrderError;

/// Limit price of an order. Always `> 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Create a price, rejecting zero and negative amounts.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidPrice` if `amount <= 0`.
    pub fn try_new(amount: Decimal) -> Result<Self, OrderError> {
        if amount <= Decimal::ZERO {
            return Err(OrderError::InvalidPrice { value: amount });
        }
        Ok(Self(amount))
    }

    /// Get the inner Decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

/// Quantity of an order. Always `> 0`; fractional amounts are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Quantity(Decimal);

impl Quantity {
    /// Create a quantity, rejecting zero and negative amounts.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidQuantity` if `amount <= 0`.
    pub fn try_new(amount: Decimal) -> Result<Self, OrderError> {
        if amount <= Decimal::ZERO {
            return Err(OrderError::InvalidQuantity { value: amount });
        }
        Ok(Self(amount))
    }

    /// Get the inner Decimal value.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

macro_rules! impl_amount_conversions {
    ($name:ident) => {
        impl TryFrom<Decimal> for $name {
            type Error = OrderError;

            fn try_from(value: Decimal) -> Result<Self, Self::Error> {
                Self::try_new(value)
            }
        }

        impl From<$name> for Decimal {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

impl_amount_conversions!(Price);
impl_amount_conversions!(Quantity);
