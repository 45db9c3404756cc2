// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Order Service - Rust Core Library
//!
//! Order lifecycle management: creating, reading, cancelling and listing
//! orders, with per-order consistency under concurrent access and a remote
//! market oracle folded into one error taxonomy.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic (no I/O)
//!   - `order_management`: Order aggregate, status machine, store contract
//!   - `shared`: Identifiers and timestamps
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: Interfaces for external systems (`MarketOraclePort`, `RoleProviderPort`)
//!   - `use_cases`: `CreateOrder`, `GetOrderStatus`, `CancelOrder`, `ListUserOrders`
//!   - `services`: `OrderOrchestrator` facade
//!   - `dto`: Data transfer objects for API boundaries
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `persistence`: In-memory order store
//!   - `market_oracle`: HTTP client, circuit breaker decorator, static oracle
//!   - `http`: Axum REST API
//!   - `config`: Dependency injection container
//!
//! ## Cross-cutting
//!
//! - `error`: Service error taxonomy and gRPC/HTTP mapping
//! - `config`: YAML configuration
//! - `resilience`: Circuit breaker
//! - `observability`: Prometheus metrics
//! - `telemetry`: Tracing subscriber

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting Modules
// =============================================================================

/// Service error taxonomy.
pub mod error;

/// Configuration loading.
pub mod config;

/// Resilience patterns.
pub mod resilience;

/// Metrics.
pub mod observability;

/// Log output.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::order_management::{
    NewOrder, Order, OrderError, OrderRepository, OrderStateMachine, OrderStatus, OrderType, Price,
    Quantity, StatusSwap,
};
pub use domain::shared::{MarketId, OrderId, Timestamp, TraceId, UserId};

// Application re-exports
pub use application::context::RequestContext;
pub use application::dto::{
    CancelOrderRequest, CreateOrderRequest, GetOrderStatusRequest, OrderDto, OrderStatusResponse,
};
pub use application::ports::{
    DefaultRoleProvider, MarketOracleError, MarketOraclePort, RoleProviderPort, UserRole,
};
pub use application::services::OrderOrchestrator;

// Infrastructure re-exports
pub use infrastructure::config::{Container, MarketOracleAdapter, ServiceContainer};
pub use infrastructure::http::{AppState, create_router};
pub use infrastructure::market_oracle::{
    CircuitBreakingMarketOracle, HttpMarketOracle, StaticMarketOracle,
};
pub use infrastructure::persistence::InMemoryOrderRepository;

// Cross-cutting re-exports
pub use error::{ErrorCode, ServiceError};
