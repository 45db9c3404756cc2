//! Order management errors.

use std::fmt;

use rust_decimal::Decimal;

use super::value_objects::OrderStatus;

/// Errors raised by the order aggregate, its value objects and the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Price is zero or negative.
    InvalidPrice {
        /// Rejected value.
        value: Decimal,
    },

    /// Quantity is zero or negative.
    InvalidQuantity {
        /// Rejected value.
        value: Decimal,
    },

    /// Unknown order type token.
    InvalidOrderType {
        /// Rejected token.
        token: String,
    },

    /// Unknown order status token.
    InvalidOrderStatus {
        /// Rejected token.
        token: String,
    },

    /// Cancel requested on an order that is already cancelled.
    AlreadyCancelled,

    /// Cancel requested on a filled or rejected order.
    CannotCancel {
        /// Current status.
        status: OrderStatus,
    },

    /// The order is in a status no operation can act on.
    InvalidStatus {
        /// Current status.
        status: OrderStatus,
    },

    /// Transition not permitted by the status machine.
    InvalidStateTransition {
        /// Current status.
        from: OrderStatus,
        /// Attempted status.
        to: OrderStatus,
    },

    /// Backing store failure.
    Storage {
        /// Error message.
        message: String,
    },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPrice { value } => write!(f, "Price must be positive, got {value}"),
            Self::InvalidQuantity { value } => {
                write!(f, "Quantity must be positive, got {value}")
            }
            Self::InvalidOrderType { token } => write!(f, "Invalid order type: '{token}'"),
            Self::InvalidOrderStatus { token } => write!(f, "Invalid order status: '{token}'"),
            Self::AlreadyCancelled => write!(f, "Order is already cancelled"),
            Self::CannotCancel { status } => {
                write!(f, "Order cannot be cancelled in status {status}")
            }
            Self::InvalidStatus { status } => write!(f, "Order is in invalid status {status}"),
            Self::InvalidStateTransition { from, to } => {
                write!(f, "Invalid order state transition: {from} -> {to}")
            }
            Self::Storage { message } => write!(f, "Order storage failure: {message}"),
        }
    }
}

impl std::error::Error for OrderError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn invalid_price_display() {
        let err = OrderError::InvalidPrice { value: dec!(-5) };
        assert_eq!(err.to_string(), "Price must be positive, got -5");
    }

    #[test]
    fn cannot_cancel_display() {
        let err = OrderError::CannotCancel {
            status: OrderStatus::Filled,
        };
        assert!(err.to_string().contains("FILLED"));
    }

    #[test]
    fn invalid_transition_display() {
        let err = OrderError::InvalidStateTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Open,
        };
        assert_eq!(
            err.to_string(),
            "Invalid order state transition: CANCELLED -> OPEN"
        );
    }

    #[test]
    fn order_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(OrderError::AlreadyCancelled);
        assert!(!err.to_string().is_empty());
    }
}
