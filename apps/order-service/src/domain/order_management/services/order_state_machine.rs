//! Order State Machine Service
//!
//! Single source of truth for which status transitions are legal.

use crate::domain::order_management::errors::OrderError;
use crate::domain::order_management::value_objects::OrderStatus;

/// Validates order status transitions.
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Check if a state transition is valid.
    #[must_use]
    pub const fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        matches!(
            (from, to),
            (OrderStatus::Unspecified, OrderStatus::Created)
                | (OrderStatus::Created, OrderStatus::Open)
                | (OrderStatus::Created, OrderStatus::Cancelled)
                | (OrderStatus::Open, OrderStatus::Filled)
                | (OrderStatus::Open, OrderStatus::Cancelled)
                | (OrderStatus::Open, OrderStatus::Rejected)
        )
    }

    /// Validate a state transition.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidStateTransition` if the edge does not exist.
    pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(OrderError::InvalidStateTransition { from, to })
        }
    }

    /// Get all valid next states from a given state.
    #[must_use]
    pub fn valid_next_states(from: OrderStatus) -> Vec<OrderStatus> {
        match from {
            OrderStatus::Unspecified => vec![OrderStatus::Created],
            OrderStatus::Created => vec![OrderStatus::Open, OrderStatus::Cancelled],
            OrderStatus::Open => vec![
                OrderStatus::Filled,
                OrderStatus::Cancelled,
                OrderStatus::Rejected,
            ],
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_can_open_or_cancel() {
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::Created,
            OrderStatus::Open
        ));
        assert!(OrderStateMachine::is_valid_transition(
            OrderStatus::Created,
            OrderStatus::Cancelled
        ));
        assert!(!OrderStateMachine::is_valid_transition(
            OrderStatus::Created,
            OrderStatus::Filled
        ));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for from in OrderStatus::ALL.into_iter().filter(OrderStatus::is_terminal) {
            assert!(OrderStateMachine::valid_next_states(from).is_empty());
            for to in OrderStatus::ALL {
                assert!(!OrderStateMachine::is_valid_transition(from, to));
            }
        }
    }

    #[test]
    fn next_states_agree_with_predicate() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert_eq!(
                    OrderStateMachine::valid_next_states(from).contains(&to),
                    OrderStateMachine::is_valid_transition(from, to),
                    "{from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn validate_transition_error() {
        let err = OrderStateMachine::validate_transition(OrderStatus::Filled, OrderStatus::Open)
            .unwrap_err();
        assert_eq!(
            err,
            OrderError::InvalidStateTransition {
                from: OrderStatus::Filled,
                to: OrderStatus::Open,
            }
        );
    }
}
