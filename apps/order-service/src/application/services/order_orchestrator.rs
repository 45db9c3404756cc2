//! Order Orchestrator
//!
//! Facade over the order use cases. Each operation's failure is logged once
//! here and counted in `order_requests_failed_total`.

use std::sync::Arc;

use crate::application::context::RequestContext;
use crate::application::dto::{
    CancelOrderRequest, CreateOrderRequest, GetOrderStatusRequest, OrderDto, OrderStatusResponse,
};
use crate::application::ports::{MarketOraclePort, RoleProviderPort};
use crate::application::use_cases::{
    CancelOrderUseCase, CreateOrderUseCase, GetOrderStatusUseCase, ListUserOrdersUseCase,
};
use crate::domain::order_management::OrderRepository;
use crate::error::ServiceError;
use crate::observability;

/// Entry point for the order lifecycle operations.
pub struct OrderOrchestrator<R, M, P>
where
    R: OrderRepository,
    M: MarketOraclePort,
    P: RoleProviderPort,
{
    create: CreateOrderUseCase<R, M, P>,
    get_status: GetOrderStatusUseCase<R>,
    cancel: CancelOrderUseCase<R>,
    list: ListUserOrdersUseCase<R>,
}

impl<R, M, P> OrderOrchestrator<R, M, P>
where
    R: OrderRepository,
    M: MarketOraclePort,
    P: RoleProviderPort,
{
    /// Wire the use cases around one shared store.
    pub fn new(order_repo: Arc<R>, market_oracle: Arc<M>, role_provider: Arc<P>) -> Self {
        Self {
            create: CreateOrderUseCase::new(Arc::clone(&order_repo), market_oracle, role_provider),
            get_status: GetOrderStatusUseCase::new(Arc::clone(&order_repo)),
            cancel: CancelOrderUseCase::new(Arc::clone(&order_repo)),
            list: ListUserOrdersUseCase::new(order_repo),
        }
    }

    /// Create an order.
    ///
    /// # Errors
    ///
    /// See [`CreateOrderUseCase::execute`].
    pub async fn create_order(
        &self,
        ctx: &RequestContext,
        request: CreateOrderRequest,
    ) -> Result<OrderStatusResponse, ServiceError> {
        let user_id = request.user_id.clone();
        let market_id = request.market_id.clone();
        self.create.execute(ctx, request).await.inspect_err(|e| {
            report_failure(
                ctx,
                "create",
                e,
                &RequestIds {
                    user_id: Some(user_id.as_str()),
                    market_id: Some(market_id.as_str()),
                    ..RequestIds::default()
                },
            );
        })
    }

    /// Read an order's status.
    ///
    /// # Errors
    ///
    /// See [`GetOrderStatusUseCase::execute`].
    pub async fn get_order_status(
        &self,
        ctx: &RequestContext,
        request: GetOrderStatusRequest,
    ) -> Result<OrderStatusResponse, ServiceError> {
        let order_id = request.order_id.clone();
        let user_id = request.user_id.clone();
        self.get_status.execute(ctx, request).await.inspect_err(|e| {
            report_failure(ctx, "get", e, &RequestIds::for_order(&order_id, &user_id));
        })
    }

    /// Cancel an order.
    ///
    /// # Errors
    ///
    /// See [`CancelOrderUseCase::execute`].
    pub async fn cancel_order(
        &self,
        ctx: &RequestContext,
        request: CancelOrderRequest,
    ) -> Result<OrderStatusResponse, ServiceError> {
        let order_id = request.order_id.clone();
        let user_id = request.user_id.clone();
        self.cancel.execute(ctx, request).await.inspect_err(|e| {
            report_failure(ctx, "cancel", e, &RequestIds::for_order(&order_id, &user_id));
        })
    }

    /// List the requester's orders, oldest first.
    ///
    /// # Errors
    ///
    /// See [`ListUserOrdersUseCase::execute`].
    pub async fn list_user_orders(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> Result<Vec<OrderDto>, ServiceError> {
        self.list.execute(ctx, user_id).await.inspect_err(|e| {
            report_failure(
                ctx,
                "list",
                e,
                &RequestIds {
                    user_id: Some(user_id),
                    ..RequestIds::default()
                },
            );
        })
    }
}

/// Identifiers a failed request carried; absent ones are not logged.
#[derive(Debug, Default, Clone, Copy)]
struct RequestIds<'a> {
    order_id: Option<&'a str>,
    user_id: Option<&'a str>,
    market_id: Option<&'a str>,
}

impl<'a> RequestIds<'a> {
    const fn for_order(order_id: &'a str, user_id: &'a str) -> Self {
        Self {
            order_id: Some(order_id),
            user_id: Some(user_id),
            market_id: None,
        }
    }
}

fn report_failure(
    ctx: &RequestContext,
    operation: &'static str,
    err: &ServiceError,
    ids: &RequestIds<'_>,
) {
    let code = err.code();
    observability::record_request_failed(operation, code.reason());

    if let ServiceError::Internal { source } = err {
        tracing::error!(
            trace_id = %ctx.trace_id(),
            operation,
            code = %code,
            order_id = ids.order_id,
            user_id = ids.user_id,
            market_id = ids.market_id,
            cause = %source,
            "Order request failed"
        );
    } else {
        tracing::warn!(
            trace_id = %ctx.trace_id(),
            operation,
            code = %code,
            order_id = ids.order_id,
            user_id = ids.user_id,
            market_id = ids.market_id,
            error = %err,
            "Order request rejected"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{DefaultRoleProvider, MarketOracleError, MockMarketOraclePort};
    use crate::domain::order_management::OrderStatus;
    use crate::infrastructure::persistence::InMemoryOrderRepository;
    use rust_decimal_macros::dec;

    fn orchestrator(
        oracle: MockMarketOraclePort,
    ) -> (
        OrderOrchestrator<InMemoryOrderRepository, MockMarketOraclePort, DefaultRoleProvider>,
        Arc<InMemoryOrderRepository>,
    ) {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let orch = OrderOrchestrator::new(
            Arc::clone(&repo),
            Arc::new(oracle),
            Arc::new(DefaultRoleProvider),
        );
        (orch, repo)
    }

    fn create_request(user: &str, market: &str) -> CreateOrderRequest {
        CreateOrderRequest {
            user_id: user.to_string(),
            market_id: market.to_string(),
            order_type: "LIMIT".to_string(),
            price: dec!(50000.00),
            quantity: dec!(1.5),
        }
    }

    #[tokio::test]
    async fn full_lifecycle() {
        let mut oracle = MockMarketOraclePort::new();
        oracle
            .expect_market_exists()
            .returning(|_, m, _| Ok(m.as_str() == "BTC-USDT"));
        let (orch, repo) = orchestrator(oracle);
        let ctx = RequestContext::background();

        let created = orch
            .create_order(&ctx, create_request("u1", "BTC-USDT"))
            .await
            .unwrap();
        assert_eq!(created.status, OrderStatus::Created);

        let read = orch
            .get_order_status(
                &ctx,
                GetOrderStatusRequest {
                    order_id: created.order_id.clone(),
                    user_id: "u1".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(read.status, OrderStatus::Created);

        let cancel = CancelOrderRequest {
            order_id: created.order_id.clone(),
            user_id: "u1".to_string(),
        };
        let cancelled = orch.cancel_order(&ctx, cancel.clone()).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let again = orch.cancel_order(&ctx, cancel).await.unwrap_err();
        assert!(matches!(again, ServiceError::AlreadyCancelled));

        let denied = orch
            .get_order_status(
                &ctx,
                GetOrderStatusRequest {
                    order_id: created.order_id,
                    user_id: "u2".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(denied, ServiceError::AccessDenied));

        let listed = orch.list_user_orders(&ctx, "u1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, OrderStatus::Cancelled);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn oracle_errors_surface_as_internal() {
        let mut oracle = MockMarketOraclePort::new();
        oracle
            .expect_market_exists()
            .returning(|_, _, _| Err(MarketOracleError::Timeout));
        let (orch, repo) = orchestrator(oracle);

        let err = orch
            .create_order(&RequestContext::background(), create_request("u1", "BTC-USDT"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Internal { .. }));
        assert_eq!(err.to_string(), "internal error");
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    /// Buffer shared with a test subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failure_log_carries_ids_as_separate_fields() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .flatten_event(true)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            report_failure(
                &RequestContext::background(),
                "cancel",
                &ServiceError::AccessDenied,
                &RequestIds::for_order("o-1", "u-1"),
            );
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let line: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(line["order_id"], "o-1");
        assert_eq!(line["user_id"], "u-1");
        assert_eq!(line["code"], "ACCESS_DENIED");
        assert!(line.get("market_id").is_none());
        assert!(line.get("ids").is_none());
    }
}
