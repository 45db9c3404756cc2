//! Order Management Aggregates

mod order;

pub use order::{NewOrder, Order, cancel_outcome};
