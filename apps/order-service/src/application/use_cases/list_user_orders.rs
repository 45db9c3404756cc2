//! List User Orders Use Case

use std::sync::Arc;

use crate::application::context::RequestContext;
use crate::application::dto::OrderDto;
use crate::domain::order_management::OrderRepository;
use crate::domain::shared::UserId;
use crate::error::ServiceError;

/// Use case for listing the requester's own orders.
pub struct ListUserOrdersUseCase<R>
where
    R: OrderRepository,
{
    order_repo: Arc<R>,
}

impl<R> ListUserOrdersUseCase<R>
where
    R: OrderRepository,
{
    /// Create a new `ListUserOrdersUseCase`.
    pub const fn new(order_repo: Arc<R>) -> Self {
        Self { order_repo }
    }

    /// All orders owned by `user_id`, oldest first.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty user id
    /// - `AccessDenied` when the authenticated identity differs
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<Vec<OrderDto>, ServiceError> {
        if user_id.trim().is_empty() {
            return Err(ServiceError::invalid_argument("user_id", "must not be empty"));
        }
        let user_id = UserId::new(user_id);

        if ctx.identity_mismatch(&user_id) {
            return Err(ServiceError::AccessDenied);
        }

        let mut orders = self.order_repo.find_by_user(&user_id).await?;
        orders.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });

        Ok(orders.iter().map(OrderDto::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_management::{NewOrder, Order, OrderType, Price, Quantity};
    use crate::domain::shared::{MarketId, TraceId};
    use crate::infrastructure::persistence::InMemoryOrderRepository;
    use rust_decimal_macros::dec;

    fn order_for(user: &str, market: &str) -> Order {
        Order::create(NewOrder {
            user_id: UserId::new(user),
            market_id: MarketId::new(market),
            order_type: OrderType::Market,
            price: Price::try_new(dec!(1)).unwrap(),
            quantity: Quantity::try_new(dec!(1)).unwrap(),
        })
    }

    #[tokio::test]
    async fn lists_only_own_orders_oldest_first() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let first = order_for("user-1", "BTC-USDT");
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = order_for("user-1", "SOL-USDT");
        repo.add(&second).await.unwrap();
        repo.add(&order_for("user-2", "BTC-USDT")).await.unwrap();
        repo.add(&first).await.unwrap();

        let uc = ListUserOrdersUseCase::new(repo);
        let orders = uc
            .execute(&RequestContext::background(), "user-1")
            .await
            .unwrap();

        let ids: Vec<_> = orders.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, vec![first.id().as_str(), second.id().as_str()]);
        assert!(orders.iter().all(|o| o.user_id == "user-1"));
    }

    #[tokio::test]
    async fn no_orders_is_empty() {
        let uc = ListUserOrdersUseCase::new(Arc::new(InMemoryOrderRepository::new()));
        let orders = uc
            .execute(&RequestContext::background(), "user-9")
            .await
            .unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn identity_mismatch_is_denied() {
        let uc = ListUserOrdersUseCase::new(Arc::new(InMemoryOrderRepository::new()));
        let ctx = RequestContext::new(TraceId::generate()).with_authenticated_user(UserId::new("user-2"));
        let err = uc.execute(&ctx, "user-1").await.unwrap_err();
        assert!(matches!(err, ServiceError::AccessDenied));
    }

    #[tokio::test]
    async fn empty_user_is_invalid() {
        let uc = ListUserOrdersUseCase::new(Arc::new(InMemoryOrderRepository::new()));
        let err = uc
            .execute(&RequestContext::background(), "")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument { .. }));
    }
}
