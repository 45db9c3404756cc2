//! Dependency wiring.

pub mod container;

pub use container::{Container, MARKET_ORACLE_BREAKER, MarketOracleAdapter, ServiceContainer};
