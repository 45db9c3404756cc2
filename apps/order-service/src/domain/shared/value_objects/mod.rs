//! Shared Value Objects
//!
//! Immutable domain types used across the order service.

mod identifiers;
mod timestamp;

pub use identifiers::{MarketId, OrderId, TraceId, UserId};
pub use timestamp::Timestamp;
