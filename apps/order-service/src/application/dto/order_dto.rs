//! Order DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order_management::{Order, OrderStatus, OrderType};

/// Input for creating an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    /// Requesting user.
    pub user_id: String,
    /// Target market.
    pub market_id: String,
    /// Order type token (`LIMIT`, `MARKET`, `STOP_LIMIT`, `STOP_MARKET`).
    pub order_type: String,
    /// Limit price.
    pub price: Decimal,
    /// Quantity.
    pub quantity: Decimal,
}

/// Input for reading an order's status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetOrderStatusRequest {
    /// Order to look up.
    pub order_id: String,
    /// Requesting user.
    pub user_id: String,
}

/// Input for cancelling an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrderRequest {
    /// Order to cancel.
    pub order_id: String,
    /// Requesting user.
    pub user_id: String,
}

/// `{order_id, status}` returned by create, get and cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusResponse {
    /// Order ID.
    pub order_id: String,
    /// Current status.
    pub status: OrderStatus,
}

impl From<&Order> for OrderStatusResponse {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id().to_string(),
            status: order.status(),
        }
    }
}

/// Full view of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDto {
    /// Order ID.
    pub order_id: String,
    /// Owner.
    pub user_id: String,
    /// Market.
    pub market_id: String,
    /// Type.
    pub order_type: OrderType,
    /// Status.
    pub status: OrderStatus,
    /// Price.
    pub price: Decimal,
    /// Quantity.
    pub quantity: Decimal,
    /// Created at (RFC 3339).
    pub created_at: String,
    /// Updated at (RFC 3339).
    pub updated_at: String,
}

impl From<&Order> for OrderDto {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id().to_string(),
            user_id: order.user_id().to_string(),
            market_id: order.market_id().to_string(),
            order_type: order.order_type(),
            status: order.status(),
            price: order.price().amount(),
            quantity: order.quantity().amount(),
            created_at: order.created_at().to_string(),
            updated_at: order.updated_at().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_management::{NewOrder, Price, Quantity};
    use crate::domain::shared::{MarketId, UserId};
    use rust_decimal_macros::dec;

    fn sample_order() -> Order {
        Order::create(NewOrder {
            user_id: UserId::new("user-1"),
            market_id: MarketId::new("BTC-USDT"),
            order_type: OrderType::StopLimit,
            price: Price::try_new(dec!(42.5)).unwrap(),
            quantity: Quantity::try_new(dec!(3)).unwrap(),
        })
    }

    #[test]
    fn status_response_from_order() {
        let order = sample_order();
        let response = OrderStatusResponse::from(&order);
        assert_eq!(response.order_id, order.id().to_string());
        assert_eq!(response.status, OrderStatus::Created);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "CREATED");
    }

    #[test]
    fn order_dto_from_order() {
        let order = sample_order();
        let dto = OrderDto::from(&order);
        assert_eq!(dto.user_id, "user-1");
        assert_eq!(dto.market_id, "BTC-USDT");
        assert_eq!(dto.order_type, OrderType::StopLimit);
        assert_eq!(dto.price, dec!(42.5));
        assert_eq!(dto.quantity, dec!(3));
        assert!(dto.created_at.ends_with('Z'));
    }

    #[test]
    fn create_request_accepts_string_decimals() {
        let json = r#"{"user_id":"u","market_id":"m","order_type":"LIMIT","price":"50000.00","quantity":"1.5"}"#;
        let req: CreateOrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.price, dec!(50000.00));
        assert_eq!(req.quantity, dec!(1.5));
    }
}
