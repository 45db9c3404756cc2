//! Cancel Order Use Case
//!
//! The status check and the write are a single compare-and-set in the store.
//! When another writer moved the order first, the status it left behind
//! decides the outcome: a second cancel fails with `AlreadyCancelled`, a
//! fill or rejection with `CannotCancel`, and a still-cancellable status
//! (e.g. `CREATED -> OPEN`) is retried.

use std::sync::Arc;

use crate::application::context::RequestContext;
use crate::application::dto::{CancelOrderRequest, OrderStatusResponse};
use crate::domain::order_management::{OrderRepository, OrderStatus, StatusSwap, cancel_outcome};
use crate::domain::shared::{OrderId, UserId};
use crate::error::ServiceError;
use crate::observability;

/// Upper bound on swap attempts. Each retry follows a forward edge of the
/// status machine, so this is never reached in practice.
const MAX_SWAP_ATTEMPTS: usize = OrderStatus::ALL.len();

/// Use case for cancelling orders.
pub struct CancelOrderUseCase<R>
where
    R: OrderRepository,
{
    order_repo: Arc<R>,
}

impl<R> CancelOrderUseCase<R>
where
    R: OrderRepository,
{
    /// Create a new `CancelOrderUseCase`.
    pub const fn new(order_repo: Arc<R>) -> Self {
        Self { order_repo }
    }

    /// Cancel an order owned by the requester.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty order or user id
    /// - `OrderNotFound` when the id is absent
    /// - `AccessDenied` on identity or ownership mismatch
    /// - `AlreadyCancelled`, `CannotCancel` or `InvalidStatus` when the
    ///   order's status does not allow cancelling
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        request: CancelOrderRequest,
    ) -> Result<OrderStatusResponse, ServiceError> {
        if request.order_id.trim().is_empty() {
            return Err(ServiceError::invalid_argument("order_id", "must not be empty"));
        }
        if request.user_id.trim().is_empty() {
            return Err(ServiceError::invalid_argument("user_id", "must not be empty"));
        }

        let order_id = OrderId::new(request.order_id);
        let user_id = UserId::new(request.user_id);

        let Some(order) = self.order_repo.find_by_id(&order_id).await? else {
            return Err(ServiceError::OrderNotFound { order_id });
        };

        if ctx.identity_mismatch(&user_id) || !order.is_owned_by(&user_id) {
            return Err(ServiceError::AccessDenied);
        }

        order.can_be_cancelled()?;

        let mut expected = order.status();
        for _ in 0..MAX_SWAP_ATTEMPTS {
            match self
                .order_repo
                .compare_and_set_status(&order_id, expected, OrderStatus::Cancelled)
                .await?
            {
                StatusSwap::Swapped(cancelled) => {
                    observability::record_order_cancelled();
                    tracing::info!(
                        trace_id = %ctx.trace_id(),
                        order_id = %order_id,
                        user_id = %user_id,
                        previous_status = %expected,
                        "Order cancelled"
                    );
                    return Ok(OrderStatusResponse::from(&cancelled));
                }
                StatusSwap::Conflict { actual } => {
                    cancel_outcome(actual)?;
                    tracing::debug!(
                        trace_id = %ctx.trace_id(),
                        order_id = %order_id,
                        expected = %expected,
                        actual = %actual,
                        "Order status changed during cancel, retrying"
                    );
                    expected = actual;
                }
                StatusSwap::NotFound => return Err(ServiceError::OrderNotFound { order_id }),
            }
        }

        Err(ServiceError::internal(format!(
            "cancel of order {order_id} did not settle after {MAX_SWAP_ATTEMPTS} attempts"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_management::{
        NewOrder, Order, OrderError, OrderType, Price, Quantity,
    };
    use crate::domain::shared::{MarketId, TraceId};
    use crate::infrastructure::persistence::InMemoryOrderRepository;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    fn new_order(user: &str) -> Order {
        Order::create(NewOrder {
            user_id: UserId::new(user),
            market_id: MarketId::new("BTC-USDT"),
            order_type: OrderType::Limit,
            price: Price::try_new(dec!(50000.00)).unwrap(),
            quantity: Quantity::try_new(dec!(1.5)).unwrap(),
        })
    }

    fn request(order: &Order, user: &str) -> CancelOrderRequest {
        CancelOrderRequest {
            order_id: order.id().to_string(),
            user_id: user.to_string(),
        }
    }

    async fn seeded(order: &Order) -> (CancelOrderUseCase<InMemoryOrderRepository>, Arc<InMemoryOrderRepository>) {
        let repo = Arc::new(InMemoryOrderRepository::new());
        repo.add(order).await.unwrap();
        (CancelOrderUseCase::new(Arc::clone(&repo)), repo)
    }

    #[tokio::test]
    async fn cancel_then_cancel_again() {
        let order = new_order("user-1");
        let (uc, repo) = seeded(&order).await;
        let ctx = RequestContext::background();

        let response = uc.execute(&ctx, request(&order, "user-1")).await.unwrap();
        assert_eq!(response.status, OrderStatus::Cancelled);

        let stored = repo.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Cancelled);

        let err = uc.execute(&ctx, request(&order, "user-1")).await.unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyCancelled));
    }

    #[tokio::test]
    async fn cancel_open_order() {
        let mut order = new_order("user-1");
        order.transition_to(OrderStatus::Open).unwrap();
        let (uc, _) = seeded(&order).await;

        let response = uc
            .execute(&RequestContext::background(), request(&order, "user-1"))
            .await
            .unwrap();
        assert_eq!(response.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn filled_order_cannot_be_cancelled() {
        let mut order = new_order("user-1");
        order.transition_to(OrderStatus::Open).unwrap();
        order.transition_to(OrderStatus::Filled).unwrap();
        let (uc, repo) = seeded(&order).await;

        let err = uc
            .execute(&RequestContext::background(), request(&order, "user-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::CannotCancel { status: OrderStatus::Filled }));

        let stored = repo.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Filled);
    }

    #[tokio::test]
    async fn non_owner_is_denied_regardless_of_status() {
        let mut order = new_order("user-1");
        order.cancel().unwrap();
        let (uc, _) = seeded(&order).await;

        let err = uc
            .execute(&RequestContext::background(), request(&order, "user-2"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AccessDenied));
    }

    #[tokio::test]
    async fn authenticated_identity_must_match() {
        let order = new_order("user-1");
        let (uc, repo) = seeded(&order).await;
        let ctx = RequestContext::new(TraceId::generate()).with_authenticated_user(UserId::new("user-2"));

        let err = uc.execute(&ctx, request(&order, "user-1")).await.unwrap_err();
        assert!(matches!(err, ServiceError::AccessDenied));
        let stored = repo.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Created);
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let (uc, _) = seeded(&new_order("user-1")).await;
        let err = uc
            .execute(
                &RequestContext::background(),
                CancelOrderRequest {
                    order_id: "missing".to_string(),
                    user_id: "user-1".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::OrderNotFound { .. }));
    }

    #[tokio::test]
    async fn empty_ids_checked_first() {
        let (uc, _) = seeded(&new_order("user-1")).await;
        let err = uc
            .execute(
                &RequestContext::background(),
                CancelOrderRequest {
                    order_id: String::new(),
                    user_id: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument { ref field, .. } if field == "order_id"));
    }

    /// Store where another writer moves the order through `interleaved`
    /// right before the first status swap lands.
    struct RacingRepository {
        inner: InMemoryOrderRepository,
        interleaved: Mutex<Vec<OrderStatus>>,
    }

    #[async_trait]
    impl OrderRepository for RacingRepository {
        async fn add(&self, order: &Order) -> Result<(), OrderError> {
            self.inner.add(order).await
        }

        async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, OrderError> {
            self.inner.find_by_id(id).await
        }

        async fn update(&self, order: &Order) -> Result<bool, OrderError> {
            self.inner.update(order).await
        }

        async fn compare_and_set_status(
            &self,
            id: &OrderId,
            expected: OrderStatus,
            next: OrderStatus,
        ) -> Result<StatusSwap, OrderError> {
            let steps = std::mem::take(&mut *self.interleaved.lock().unwrap());
            for step in steps {
                let current = self.inner.find_by_id(id).await?.unwrap().status();
                let swap = self.inner.compare_and_set_status(id, current, step).await?;
                assert!(matches!(swap, StatusSwap::Swapped(_)));
            }
            self.inner.compare_and_set_status(id, expected, next).await
        }

        async fn find_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, OrderError> {
            self.inner.find_by_user(user_id).await
        }

        async fn count(&self) -> Result<usize, OrderError> {
            self.inner.count().await
        }
    }

    async fn racing(
        interleaved: Vec<OrderStatus>,
        stored: &Order,
    ) -> (CancelOrderUseCase<RacingRepository>, Arc<RacingRepository>) {
        let repo = Arc::new(RacingRepository {
            inner: InMemoryOrderRepository::new(),
            interleaved: Mutex::new(interleaved),
        });
        repo.add(stored).await.unwrap();
        (CancelOrderUseCase::new(Arc::clone(&repo)), repo)
    }

    #[tokio::test]
    async fn lost_race_to_another_cancel_is_already_cancelled() {
        let order = new_order("user-1");
        let (uc, _) = racing(vec![OrderStatus::Cancelled], &order).await;

        let err = uc
            .execute(&RequestContext::background(), request(&order, "user-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyCancelled));
    }

    #[tokio::test]
    async fn lost_race_to_a_fill_cannot_cancel() {
        let order = new_order("user-1");
        let (uc, repo) = racing(vec![OrderStatus::Open, OrderStatus::Filled], &order).await;

        let err = uc
            .execute(&RequestContext::background(), request(&order, "user-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::CannotCancel { status: OrderStatus::Filled }));

        let stored = repo.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Filled);
    }

    #[tokio::test]
    async fn still_cancellable_after_race_is_retried() {
        let order = new_order("user-1");
        let (uc, repo) = racing(vec![OrderStatus::Open], &order).await;

        let response = uc
            .execute(&RequestContext::background(), request(&order, "user-1"))
            .await
            .unwrap();
        assert_eq!(response.status, OrderStatus::Cancelled);

        let stored = repo.find_by_id(order.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Cancelled);
    }
}
