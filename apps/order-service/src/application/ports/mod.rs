//! Application Ports (Driven)
//!
//! Interfaces the use cases depend on; adapters live in the infrastructure
//! layer. The order store port is the domain's `OrderRepository`.

mod market_oracle_port;
mod role_provider_port;

#[cfg(test)]
pub use market_oracle_port::MockMarketOraclePort;
pub use market_oracle_port::{MarketOracleError, MarketOraclePort, UserRole};
pub use role_provider_port::{DefaultRoleProvider, RoleProviderPort};
