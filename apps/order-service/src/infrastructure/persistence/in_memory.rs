//! In-memory order store.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::order_management::{
    Order, OrderError, OrderRepository, OrderStateMachine, OrderStatus, StatusSwap,
};
use crate::domain::shared::{OrderId, UserId};

/// In-memory implementation of `OrderRepository`.
///
/// Lookups take the read lock; every mutation takes the write lock. State
/// lives for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
        }
    }

    /// Get the number of orders in the repository.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn add(&self, order: &Order) -> Result<(), OrderError> {
        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);
        orders.insert(order.id().clone(), order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderError> {
        let orders = self.orders.read().unwrap_or_else(PoisonError::into_inner);
        Ok(orders.get(id).cloned())
    }

    async fn update(&self, order: &Order) -> Result<bool, OrderError> {
        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);
        match orders.get_mut(order.id()) {
            Some(stored) => {
                *stored = order.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn compare_and_set_status(
        &self,
        id: &OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<StatusSwap, OrderError> {
        OrderStateMachine::validate_transition(expected, next)?;

        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);
        let Some(stored) = orders.get_mut(id) else {
            return Ok(StatusSwap::NotFound);
        };

        let actual = stored.status();
        if actual != expected {
            return Ok(StatusSwap::Conflict { actual });
        }

        stored.transition_to(next)?;
        Ok(StatusSwap::Swapped(stored.clone()))
    }

    async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderError> {
        let orders = self.orders.read().unwrap_or_else(PoisonError::into_inner);
        Ok(orders
            .values()
            .filter(|o| o.is_owned_by(user_id))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<usize, OrderError> {
        Ok(self.len())
    }
}
