//! HTTP Controller (Driver Adapter)
//!
//! Axum REST API over the [`OrderOrchestrator`].
//!
//! Request headers:
//!
//! - `x-trace-id`: correlation id, generated when absent and echoed back
//! - `x-user-id`: identity authenticated by the edge proxy
//! - `x-request-timeout-ms`: per-request deadline

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;

use crate::application::context::RequestContext;
use crate::application::dto::{
    CreateOrderRequest, GetOrderStatusRequest, OrderDto, OrderStatusResponse,
};
use crate::application::ports::{MarketOraclePort, RoleProviderPort};
use crate::application::services::OrderOrchestrator;
use crate::domain::order_management::OrderRepository;
use crate::domain::shared::{TraceId, UserId};
use crate::error::ServiceError;

use super::request::{ApiJson, CancelOrderBody, CreateOrderBody, OrderStatusQuery};
use super::response::{ApiError, HealthResponse};

/// Correlation id header.
pub const TRACE_ID_HEADER: &str = "x-trace-id";
/// Authenticated identity header.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Request deadline header (milliseconds).
pub const TIMEOUT_HEADER: &str = "x-request-timeout-ms";

/// Application state shared across handlers.
pub struct AppState<R, M, P>
where
    R: OrderRepository,
    M: MarketOraclePort,
    P: RoleProviderPort,
{
    /// Order operations.
    pub orchestrator: Arc<OrderOrchestrator<R, M, P>>,
    /// Parent of every request's cancellation token; cancelled on shutdown.
    pub shutdown: CancellationToken,
    /// Application version.
    pub version: String,
}

impl<R, M, P> AppState<R, M, P>
where
    R: OrderRepository,
    M: MarketOraclePort,
    P: RoleProviderPort,
{
    /// Create state around an orchestrator.
    pub fn new(orchestrator: Arc<OrderOrchestrator<R, M, P>>, version: impl Into<String>) -> Self {
        Self {
            orchestrator,
            shutdown: CancellationToken::new(),
            version: version.into(),
        }
    }

    /// Use `token` as the parent of request cancellation.
    #[must_use]
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }
}

impl<R, M, P> Clone for AppState<R, M, P>
where
    R: OrderRepository,
    M: MarketOraclePort,
    P: RoleProviderPort,
{
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
            shutdown: self.shutdown.clone(),
            version: self.version.clone(),
        }
    }
}

/// Create the HTTP router with all endpoints.
///
/// `/health` is mounted only when `health_enabled` is set.
pub fn create_router<R, M, P>(state: AppState<R, M, P>, health_enabled: bool) -> Router
where
    R: OrderRepository + 'static,
    M: MarketOraclePort + 'static,
    P: RoleProviderPort + 'static,
{
    let mut router = Router::new()
        .route("/api/v1/orders", post(create_order))
        .route("/api/v1/orders/{order_id}", get(get_order_status))
        .route("/api/v1/orders/{order_id}/cancel", post(cancel_order))
        .route("/api/v1/users/{user_id}/orders", get(list_user_orders));

    if health_enabled {
        router = router.route("/health", get(health_check));
    }

    router
        .layer(middleware::from_fn(propagate_trace_id))
        .with_state(state)
}

/// Ensure every request carries an `x-trace-id` and echo it on the response.
async fn propagate_trace_id(mut request: Request, next: Next) -> Response {
    let trace_id = match request
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
    {
        Some(existing) => existing.to_string(),
        None => TraceId::generate().into_inner(),
    };

    let header = HeaderValue::from_str(&trace_id).ok();
    if let Some(value) = &header {
        request.headers_mut().insert(TRACE_ID_HEADER, value.clone());
    }

    let mut response = next.run(request).await;
    if let Some(value) = header {
        response.headers_mut().insert(TRACE_ID_HEADER, value);
    }
    response
}

/// Build the request context from headers.
fn request_context(
    shutdown: &CancellationToken,
    headers: &HeaderMap,
) -> Result<RequestContext, ApiError> {
    let trace_id = header_str(headers, TRACE_ID_HEADER)
        .map_or_else(TraceId::generate, TraceId::new);

    let mut ctx = RequestContext::new(trace_id).with_cancellation(shutdown.child_token());

    if let Some(user) = header_str(headers, USER_ID_HEADER) {
        ctx = ctx.with_authenticated_user(UserId::new(user));
    }

    if let Some(raw) = header_str(headers, TIMEOUT_HEADER) {
        let millis: u64 = raw.parse().map_err(|_| {
            ServiceError::invalid_argument(TIMEOUT_HEADER, "must be a whole number of milliseconds")
        })?;
        ctx = ctx.with_timeout(Duration::from_millis(millis));
    }

    Ok(ctx)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Health check endpoint.
async fn health_check<R, M, P>(State(state): State<AppState<R, M, P>>) -> impl IntoResponse
where
    R: OrderRepository,
    M: MarketOraclePort,
    P: RoleProviderPort,
{
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    })
}

/// `POST /api/v1/orders`
async fn create_order<R, M, P>(
    State(state): State<AppState<R, M, P>>,
    headers: HeaderMap,
    ApiJson(body): ApiJson<CreateOrderBody>,
) -> Result<(StatusCode, Json<OrderStatusResponse>), ApiError>
where
    R: OrderRepository,
    M: MarketOraclePort,
    P: RoleProviderPort,
{
    let ctx = request_context(&state.shutdown, &headers)?;
    let request = CreateOrderRequest::try_from(body)?;
    let response = state.orchestrator.create_order(&ctx, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `GET /api/v1/orders/{order_id}?user_id=..`
async fn get_order_status<R, M, P>(
    State(state): State<AppState<R, M, P>>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    Query(query): Query<OrderStatusQuery>,
) -> Result<Json<OrderStatusResponse>, ApiError>
where
    R: OrderRepository,
    M: MarketOraclePort,
    P: RoleProviderPort,
{
    let ctx = request_context(&state.shutdown, &headers)?;
    let request = GetOrderStatusRequest {
        order_id,
        user_id: query.user_id,
    };
    let response = state.orchestrator.get_order_status(&ctx, request).await?;
    Ok(Json(response))
}

/// `POST /api/v1/orders/{order_id}/cancel`
async fn cancel_order<R, M, P>(
    State(state): State<AppState<R, M, P>>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    ApiJson(body): ApiJson<CancelOrderBody>,
) -> Result<Json<OrderStatusResponse>, ApiError>
where
    R: OrderRepository,
    M: MarketOraclePort,
    P: RoleProviderPort,
{
    let ctx = request_context(&state.shutdown, &headers)?;
    let response = state
        .orchestrator
        .cancel_order(&ctx, body.into_request(order_id))
        .await?;
    Ok(Json(response))
}

/// `GET /api/v1/users/{user_id}/orders`
async fn list_user_orders<R, M, P>(
    State(state): State<AppState<R, M, P>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<OrderDto>>, ApiError>
where
    R: OrderRepository,
    M: MarketOraclePort,
    P: RoleProviderPort,
{
    let ctx = request_context(&state.shutdown, &headers)?;
    let orders = state.orchestrator.list_user_orders(&ctx, &user_id).await?;
    Ok(Json(orders))
}
