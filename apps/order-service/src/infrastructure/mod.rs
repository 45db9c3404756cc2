//! Infrastructure Layer
//!
//! Adapters for the ports defined in the application layer.
//!
//! - **Driven Adapters (Outbound)**
//!   - `persistence/`: In-memory order store
//!   - `market_oracle/`: Market service client, circuit breaker decorator,
//!     fixed-set oracle
//!
//! - **Driver Adapters (Inbound)**
//!   - `http/`: REST API controllers
//!
//! - `config/`: Dependency injection container

pub mod config;
pub mod http;
pub mod market_oracle;
pub mod persistence;

pub use config::{Container, MarketOracleAdapter, ServiceContainer};
pub use market_oracle::{CircuitBreakingMarketOracle, HttpMarketOracle, StaticMarketOracle};
pub use persistence::InMemoryOrderRepository;
