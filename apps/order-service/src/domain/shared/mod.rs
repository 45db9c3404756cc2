//! Shared Domain Types
//!
//! Identifiers and timestamps used by every part of the service.

pub mod value_objects;

pub use value_objects::{MarketId, OrderId, Timestamp, TraceId, UserId};
