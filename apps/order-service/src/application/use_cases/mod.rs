//! Application Use Cases
//!
//! One use case per orchestrator operation.

mod cancel_order;
mod create_order;
mod get_order_status;
mod list_user_orders;

pub use cancel_order::CancelOrderUseCase;
pub use create_order::CreateOrderUseCase;
pub use get_order_status::GetOrderStatusUseCase;
pub use list_user_orders::ListUserOrdersUseCase;
