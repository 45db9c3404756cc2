//! Order Aggregate Root
//!
//! Owns the order's data and enforces the status machine. The user, market,
//! type, price and quantity are fixed at creation; only the status (and the
//! update timestamp that follows it) changes afterwards.

use serde::{Deserialize, Serialize};

use crate::domain::order_management::errors::OrderError;
use crate::domain::order_management::services::OrderStateMachine;
use crate::domain::order_management::value_objects::{OrderStatus, OrderType, Price, Quantity};
use crate::domain::shared::{MarketId, OrderId, Timestamp, UserId};

/// Validated input for a new order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Owner of the order.
    pub user_id: UserId,
    /// Market the order trades in.
    pub market_id: MarketId,
    /// Requested order type.
    pub order_type: OrderType,
    /// Limit price.
    pub price: Price,
    /// Quantity to trade.
    pub quantity: Quantity,
}

/// Order Aggregate Root.
// `order_type` mirrors the wire field name.
#[allow(clippy::struct_field_names)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    market_id: MarketId,
    order_type: OrderType,
    status: OrderStatus,
    price: Price,
    quantity: Quantity,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Order {
    /// Create a new order in `CREATED` status with a freshly generated id.
    #[must_use]
    pub fn create(new: NewOrder) -> Self {
        Self::create_with_id(OrderId::generate(), new)
    }

    /// Create a new order in `CREATED` status with a caller-supplied id.
    ///
    /// The caller is responsible for the id being unique.
    #[must_use]
    pub fn create_with_id(id: OrderId, new: NewOrder) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            user_id: new.user_id,
            market_id: new.market_id,
            order_type: new.order_type,
            status: OrderStatus::Created,
            price: new.price,
            quantity: new.quantity,
            created_at: now,
            updated_at: now,
        }
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Get the order ID.
    #[must_use]
    pub const fn id(&self) -> &OrderId {
        &self.id
    }

    /// Get the owning user.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Get the market.
    #[must_use]
    pub const fn market_id(&self) -> &MarketId {
        &self.market_id
    }

    /// Get the order type.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Get the current status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Get the price.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Get the quantity.
    #[must_use]
    pub const fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Get the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    // ========================================================================
    // Behaviour
    // ========================================================================

    /// Returns true if `user_id` owns this order.
    #[must_use]
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    /// Check whether the order may be cancelled in its current status.
    ///
    /// # Errors
    ///
    /// - `AlreadyCancelled` when the order is `CANCELLED`
    /// - `CannotCancel` when it is `FILLED` or `REJECTED`
    /// - `InvalidStatus` when it is `UNSPECIFIED`
    pub const fn can_be_cancelled(&self) -> Result<(), OrderError> {
        cancel_outcome(self.status)
    }

    /// Cancel the order.
    ///
    /// # Errors
    ///
    /// Same as [`Order::can_be_cancelled`].
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        self.can_be_cancelled()?;
        self.transition_to(OrderStatus::Cancelled)
    }

    /// Move the order to `next` if the status machine allows it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` for edges the machine does not have.
    pub fn transition_to(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        OrderStateMachine::validate_transition(self.status, next)?;
        self.status = next;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

/// Cancel decision for a bare status.
///
/// Shared by the aggregate and by callers re-checking a status they observed
/// in the store.
///
/// # Errors
///
/// See [`Order::can_be_cancelled`].
pub const fn cancel_outcome(status: OrderStatus) -> Result<(), OrderError> {
    match status {
        OrderStatus::Created | OrderStatus::Open => Ok(()),
        OrderStatus::Cancelled => Err(OrderError::AlreadyCancelled),
        OrderStatus::Filled | OrderStatus::Rejected => Err(OrderError::CannotCancel { status }),
        OrderStatus::Unspecified => Err(OrderError::InvalidStatus { status }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_order(user: &str) -> NewOrder {
        NewOrder {
            user_id: UserId::new(user),
            market_id: MarketId::new("BTC-USDT"),
            order_type: OrderType::Limit,
            price: Price::try_new(dec!(50000.00)).unwrap(),
            quantity: Quantity::try_new(dec!(1.5)).unwrap(),
        }
    }

    fn order_in(status: OrderStatus) -> Order {
        let mut order = Order::create(new_order("user-1"));
        match status {
            OrderStatus::Created => {}
            OrderStatus::Open => order.transition_to(OrderStatus::Open).unwrap(),
            OrderStatus::Cancelled => order.cancel().unwrap(),
            OrderStatus::Filled | OrderStatus::Rejected => {
                order.transition_to(OrderStatus::Open).unwrap();
                order.transition_to(status).unwrap();
            }
            OrderStatus::Unspecified => order.status = OrderStatus::Unspecified,
        }
        order
    }

    #[test]
    fn create_sets_initial_state() {
        let order = Order::create(new_order("user-1"));

        assert_eq!(order.status(), OrderStatus::Created);
        assert_eq!(order.user_id().as_str(), "user-1");
        assert_eq!(order.market_id().as_str(), "BTC-USDT");
        assert_eq!(order.order_type(), OrderType::Limit);
        assert_eq!(order.price().amount(), dec!(50000.00));
        assert_eq!(order.quantity().amount(), dec!(1.5));
        assert_eq!(order.created_at(), order.updated_at());
        assert!(!order.id().is_blank());
    }

    #[test]
    fn create_generates_distinct_ids() {
        let a = Order::create(new_order("user-1"));
        let b = Order::create(new_order("user-1"));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn create_with_id_keeps_id() {
        let order = Order::create_with_id(OrderId::new("ord-1"), new_order("user-1"));
        assert_eq!(order.id().as_str(), "ord-1");
    }

    #[test]
    fn ownership() {
        let order = Order::create(new_order("user-1"));
        assert!(order.is_owned_by(&UserId::new("user-1")));
        assert!(!order.is_owned_by(&UserId::new("user-2")));
        assert!(!order.is_owned_by(&UserId::new("")));
    }

    #[test]
    fn can_be_cancelled_by_status() {
        assert!(order_in(OrderStatus::Created).can_be_cancelled().is_ok());
        assert!(order_in(OrderStatus::Open).can_be_cancelled().is_ok());
        assert_eq!(
            order_in(OrderStatus::Cancelled).can_be_cancelled(),
            Err(OrderError::AlreadyCancelled)
        );
        assert_eq!(
            order_in(OrderStatus::Filled).can_be_cancelled(),
            Err(OrderError::CannotCancel {
                status: OrderStatus::Filled
            })
        );
        assert_eq!(
            order_in(OrderStatus::Rejected).can_be_cancelled(),
            Err(OrderError::CannotCancel {
                status: OrderStatus::Rejected
            })
        );
        assert_eq!(
            order_in(OrderStatus::Unspecified).can_be_cancelled(),
            Err(OrderError::InvalidStatus {
                status: OrderStatus::Unspecified
            })
        );
    }

    #[test]
    fn cancel_from_created_and_open() {
        let mut created = order_in(OrderStatus::Created);
        created.cancel().unwrap();
        assert_eq!(created.status(), OrderStatus::Cancelled);

        let mut open = order_in(OrderStatus::Open);
        open.cancel().unwrap();
        assert_eq!(open.status(), OrderStatus::Cancelled);
    }

    #[test]
    fn cancel_twice_fails_without_change() {
        let mut order = order_in(OrderStatus::Created);
        order.cancel().unwrap();
        let snapshot = order.clone();

        assert_eq!(order.cancel(), Err(OrderError::AlreadyCancelled));
        assert_eq!(order, snapshot);
    }

    #[test]
    fn transition_bumps_updated_at() {
        let mut order = order_in(OrderStatus::Created);
        let before = order.updated_at();
        order.transition_to(OrderStatus::Open).unwrap();
        assert!(order.updated_at() >= before);
        assert_eq!(order.status(), OrderStatus::Open);
    }

    #[test]
    fn illegal_transition_rejected() {
        let mut order = order_in(OrderStatus::Created);
        let err = order.transition_to(OrderStatus::Filled).unwrap_err();
        assert_eq!(
            err,
            OrderError::InvalidStateTransition {
                from: OrderStatus::Created,
                to: OrderStatus::Filled,
            }
        );
        assert_eq!(order.status(), OrderStatus::Created);
    }

    #[test]
    fn serde_roundtrip_preserves_order() {
        let order = order_in(OrderStatus::Open);
        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains("\"status\":\"OPEN\""));
        assert!(json.contains("\"price\":\"50000.00\""));

        let parsed: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, order);
    }
}
