//! Create Order Use Case

use std::sync::Arc;

use crate::application::context::RequestContext;
use crate::application::dto::{CreateOrderRequest, OrderStatusResponse};
use crate::application::ports::{MarketOracleError, MarketOraclePort, RoleProviderPort, UserRole};
use crate::domain::order_management::{NewOrder, Order, OrderRepository, OrderType, Price, Quantity};
use crate::domain::shared::{MarketId, UserId};
use crate::error::ServiceError;
use crate::observability;

/// Use case for creating orders.
///
/// All checks run before the single store write, so a failed create leaves
/// no trace in the store.
pub struct CreateOrderUseCase<R, M, P>
where
    R: OrderRepository,
    M: MarketOraclePort,
    P: RoleProviderPort,
{
    order_repo: Arc<R>,
    market_oracle: Arc<M>,
    role_provider: Arc<P>,
}

impl<R, M, P> CreateOrderUseCase<R, M, P>
where
    R: OrderRepository,
    M: MarketOraclePort,
    P: RoleProviderPort,
{
    /// Create a new `CreateOrderUseCase`.
    pub const fn new(order_repo: Arc<R>, market_oracle: Arc<M>, role_provider: Arc<P>) -> Self {
        Self {
            order_repo,
            market_oracle,
            role_provider,
        }
    }

    /// Validate, confirm the market and store a new order.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for an empty user or market id
    /// - `InvalidPrice` / `InvalidQuantity` for non-positive amounts
    /// - `InvalidOrderType` for an unknown type token
    /// - `AccessDenied` when the authenticated identity differs from `user_id`
    /// - `Internal` when the oracle cannot answer
    /// - `MarketNotAvailable` when the oracle answers no
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        request: CreateOrderRequest,
    ) -> Result<OrderStatusResponse, ServiceError> {
        if request.user_id.trim().is_empty() {
            return Err(ServiceError::invalid_argument("user_id", "must not be empty"));
        }
        if request.market_id.trim().is_empty() {
            return Err(ServiceError::invalid_argument("market_id", "must not be empty"));
        }

        let price = Price::try_new(request.price)?;
        let quantity = Quantity::try_new(request.quantity)?;
        let order_type: OrderType = request.order_type.parse()?;

        let user_id = UserId::new(request.user_id);
        let market_id = MarketId::new(request.market_id);

        if ctx.identity_mismatch(&user_id) {
            return Err(ServiceError::AccessDenied);
        }

        let roles = self.role_provider.roles_for(ctx, &user_id);

        let exists = self.check_market(ctx, &market_id, &roles).await?;
        if !exists {
            return Err(ServiceError::MarketNotAvailable { market_id });
        }

        let order = Order::create(NewOrder {
            user_id,
            market_id,
            order_type,
            price,
            quantity,
        });
        self.order_repo.add(&order).await?;

        observability::record_order_created(order_type.as_str());
        tracing::info!(
            trace_id = %ctx.trace_id(),
            order_id = %order.id(),
            user_id = %order.user_id(),
            market_id = %order.market_id(),
            order_type = %order_type,
            "Order created"
        );

        Ok(OrderStatusResponse::from(&order))
    }

    async fn check_market(
        &self,
        ctx: &RequestContext,
        market_id: &MarketId,
        roles: &[UserRole],
    ) -> Result<bool, ServiceError> {
        // A dead context never reaches the network.
        let result = if ctx.is_cancelled() {
            Err(MarketOracleError::Cancelled)
        } else if ctx.is_expired() {
            Err(MarketOracleError::Timeout)
        } else {
            self.market_oracle.market_exists(ctx, market_id, roles).await
        };

        match result {
            Ok(true) => {
                observability::record_market_oracle_call("exists");
                Ok(true)
            }
            Ok(false) => {
                observability::record_market_oracle_call("absent");
                Ok(false)
            }
            Err(e) => {
                observability::record_market_oracle_call(e.label());
                Err(ServiceError::internal(e))
            }
        }
    }
}
