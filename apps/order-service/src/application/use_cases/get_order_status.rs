//! Get Order Status Use Case

use std::sync::Arc;

use crate::application::context::RequestContext;
use crate::application::dto::{GetOrderStatusRequest, OrderStatusResponse};
use crate::domain::order_management::OrderRepository;
use crate::domain::shared::{OrderId, UserId};
use crate::error::ServiceError;

/// Use case for reading an order's status.
pub struct GetOrderStatusUseCase<R>
where
    R: OrderRepository,
{
    order_repo: Arc<R>,
}

impl<R> GetOrderStatusUseCase<R>
where
    R: OrderRepository,
{
    /// Create a new `GetOrderStatusUseCase`.
    pub const fn new(order_repo: Arc<R>) -> Self {
        Self { order_repo }
    }

    /// Return `{order_id, status}` for an order owned by the requester.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty order or user id
    /// - `OrderNotFound` when the id is absent
    /// - `AccessDenied` when the requester does not own the order
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        request: GetOrderStatusRequest,
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

        if !order.is_owned_by(&user_id) {
            return Err(ServiceError::AccessDenied);
        }

        tracing::debug!(
            trace_id = %ctx.trace_id(),
            order_id = %order_id,
            status = %order.status(),
            "Order status read"
        );

        Ok(OrderStatusResponse::from(&order))
    }
}
