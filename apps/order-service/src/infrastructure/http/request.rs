//! HTTP request bodies.
//!
//! Amounts should travel as decimal strings so that no precision is lost in
//! JSON number handling. Plain JSON numbers are accepted too. Both are parsed
//! here before reaching the orchestrator.

use std::str::FromStr;

use axum::{Json, extract::FromRequest, extract::rejection::JsonRejection};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::response::ApiError;
use crate::application::dto::{CancelOrderRequest, CreateOrderRequest};
use crate::error::ServiceError;

/// JSON body extractor whose rejections render as [`ApiError`].
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ServiceError::InvalidArgument {
            field: "body".to_string(),
            reason: rejection.body_text(),
        })
    }
}

/// An amount as sent by the client: a decimal string, a JSON number, or
/// anything else (which never parses).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountField {
    /// Decimal string, e.g. `"50000.25"`.
    Text(String),
    /// JSON number, e.g. `50000.25`.
    Number(serde_json::Number),
    /// Any other JSON value.
    Other(serde_json::Value),
}

impl Default for AmountField {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl AmountField {
    fn parse(&self) -> Option<Decimal> {
        match self {
            Self::Text(raw) => parse_amount(raw),
            Self::Number(n) => parse_amount(&n.to_string()),
            Self::Other(_) => None,
        }
    }

    fn raw(&self) -> String {
        match self {
            Self::Text(raw) => raw.clone(),
            Self::Number(n) => n.to_string(),
            Self::Other(v) => v.to_string(),
        }
    }
}

impl From<&str> for AmountField {
    fn from(raw: &str) -> Self {
        Self::Text(raw.to_string())
    }
}

/// Body of `POST /api/v1/orders`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateOrderBody {
    /// Requesting user.
    pub user_id: String,
    /// Target market.
    pub market_id: String,
    /// Order type token.
    pub order_type: String,
    /// Price, preferably as a decimal string.
    pub price: AmountField,
    /// Quantity, preferably as a decimal string.
    pub quantity: AmountField,
}

impl TryFrom<CreateOrderBody> for CreateOrderRequest {
    type Error = ServiceError;

    fn try_from(body: CreateOrderBody) -> Result<Self, Self::Error> {
        let price = body
            .price
            .parse()
            .ok_or_else(|| ServiceError::InvalidPrice { value: body.price.raw() })?;
        let quantity = body.quantity.parse().ok_or_else(|| ServiceError::InvalidQuantity {
            value: body.quantity.raw(),
        })?;

        Ok(Self {
            user_id: body.user_id,
            market_id: body.market_id,
            order_type: body.order_type,
            price,
            quantity,
        })
    }
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Body of `POST /api/v1/orders/{order_id}/cancel`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CancelOrderBody {
    /// Requesting user.
    pub user_id: String,
}

impl CancelOrderBody {
    /// Combine with the order id from the path.
    #[must_use]
    pub fn into_request(self, order_id: String) -> CancelOrderRequest {
        CancelOrderRequest {
            order_id,
            user_id: self.user_id,
        }
    }
}

/// Query string of `GET /api/v1/orders/{order_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderStatusQuery {
    /// Requesting user.
    pub user_id: String,
}
