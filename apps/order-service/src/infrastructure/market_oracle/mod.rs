//! Market Oracle Adapters
//!
//! Implementations of [`MarketOraclePort`](crate::application::ports::MarketOraclePort):
//! the HTTP client for the market service, a circuit-breaking decorator and a
//! fixed-set oracle for development.

pub mod circuit_breaking;
pub mod http_client;
pub mod static_oracle;

pub use circuit_breaking::CircuitBreakingMarketOracle;
pub use http_client::{HttpMarketOracle, MarketEntry, MarketsResponse};
pub use static_oracle::StaticMarketOracle;
