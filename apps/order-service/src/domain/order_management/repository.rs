//! Order Repository Trait
//!
//! Persistence abstraction for orders, implemented by adapters in the
//! infrastructure layer. Implementations hand out copies; callers never
//! hold a live reference into the store.

use async_trait::async_trait;

use super::aggregate::Order;
use super::errors::OrderError;
use super::value_objects::OrderStatus;
use crate::domain::shared::{OrderId, UserId};

/// Outcome of [`OrderRepository::compare_and_set_status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSwap {
    /// The status was replaced; carries a copy of the updated record.
    Swapped(Order),
    /// The stored status differed from the expected one; nothing was written.
    Conflict {
        /// Status found in the store.
        actual: OrderStatus,
    },
    /// No order with that id.
    NotFound,
}

/// Repository trait for Order persistence.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert an order, overwriting any record with the same id.
    ///
    /// # Errors
    ///
    /// Returns error if persistence fails.
    async fn add(&self, order: &Order) -> Result<(), OrderError>;

    /// Find an order by its ID.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderError>;

    /// Replace an existing order. Returns `false` (and writes nothing) when
    /// the id is not present.
    ///
    /// # Errors
    ///
    /// Returns error if persistence fails.
    async fn update(&self, order: &Order) -> Result<bool, OrderError>;

    /// Atomically move an order from `expected` to `next`.
    ///
    /// The read of the current status and the write happen in one critical
    /// section, so concurrent callers observe a single winner.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` if `expected -> next` is not a legal
    /// edge, or a storage error.
    async fn compare_and_set_status(
        &self,
        id: &OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<StatusSwap, OrderError>;

    /// All orders owned by `user_id`, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderError>;

    /// Number of stored orders.
    ///
    /// # Errors
    ///
    /// Returns error if the query fails.
    async fn count(&self) -> Result<usize, OrderError>;
}
