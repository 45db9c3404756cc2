//! Data Transfer Objects (DTOs)
//!
//! Plain request/response records at the orchestrator boundary.

mod order_dto;

pub use order_dto::{
    CancelOrderRequest, CreateOrderRequest, GetOrderStatusRequest, OrderDto, OrderStatusResponse,
};
