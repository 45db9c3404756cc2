//! Order Management Value Objects

mod amounts;
mod order_status;
mod order_type;

pub use amounts::{Price, Quantity};
pub use order_status::OrderStatus;
pub use order_type::OrderType;
