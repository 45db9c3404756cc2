//! Domain Layer
//!
//! Business rules with no I/O:
//!
//! - **Aggregates**: the `Order` consistency boundary
//! - **Value Objects**: identifiers, statuses, positive amounts
//! - **Domain Services**: the order status machine
//! - **Repository Traits**: persistence abstractions (implemented in adapters)
//!
//! # Bounded Contexts
//!
//! - [`order_management`]: order lifecycle, ownership and cancellation rules

pub mod order_management;
pub mod shared;
