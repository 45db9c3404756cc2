//! Order Management Bounded Context
//!
//! The order entity, its status machine and the persistence port.
//!
//! # Key Concepts
//!
//! - **Order Aggregate**: user, market, type, price and quantity fixed at
//!   creation; status moves only along legal edges
//! - **Status Machine**: `CREATED -> OPEN -> {FILLED, CANCELLED, REJECTED}`
//!   plus `CREATED -> CANCELLED`
//! - **Repository**: copy-out store with an atomic status swap

pub mod aggregate;
pub mod errors;
pub mod repository;
pub mod services;
pub mod value_objects;

pub use aggregate::{NewOrder, Order, cancel_outcome};
pub use errors::OrderError;
pub use repository::{OrderRepository, StatusSwap};
pub use services::OrderStateMachine;
pub use value_objects::{OrderStatus, OrderType, Price, Quantity};
