//! Service error taxonomy and transport mapping.
//!
//! Every orchestrator operation fails with a [`ServiceError`]. Each kind has a
//! stable [`ErrorCode`] that maps onto a gRPC status code (with `tonic-types`
//! rich details) and an HTTP status.
//!
//! # Status Codes
//!
//! | Kind | gRPC | HTTP |
//! |------|------|------|
//! | `InvalidPrice`, `InvalidQuantity`, `InvalidOrderType`, `InvalidArgument` | `INVALID_ARGUMENT` (3) | 400 |
//! | `AccessDenied` | `PERMISSION_DENIED` (7) | 403 |
//! | `OrderNotFound`, `MarketNotAvailable` | `NOT_FOUND` (5) | 404 |
//! | `AlreadyCancelled`, `CannotCancel`, `InvalidStatus` | `FAILED_PRECONDITION` (9) | 409 |
//! | `Internal` | `INTERNAL` (13) | 500 |

use std::collections::HashMap;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tonic::Code;
use tonic_types::{ErrorDetails, StatusExt};

use crate::domain::order_management::{OrderError, OrderStatus};
use crate::domain::shared::{MarketId, OrderId};

/// Domain reported in gRPC `ErrorInfo`.
pub const ERROR_DOMAIN: &str = "orders.service";

/// Stable error codes, one per [`ServiceError`] kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client input (INVALID_ARGUMENT)
    /// Price not strictly positive or not a number.
    InvalidPrice,
    /// Quantity not strictly positive or not a number.
    InvalidQuantity,
    /// Unknown order type token.
    InvalidOrderType,
    /// Missing or malformed request field.
    InvalidArgument,

    // Permission (PERMISSION_DENIED)
    /// Ownership or identity mismatch.
    AccessDenied,

    // Not found (NOT_FOUND)
    /// Order id absent.
    OrderNotFound,
    /// Market absent or not accessible.
    MarketNotAvailable,

    // Failed precondition (FAILED_PRECONDITION)
    /// Order already cancelled.
    AlreadyCancelled,
    /// Order filled or rejected.
    CannotCancel,
    /// Order in an unusable status.
    InvalidStatus,

    // Internal (INTERNAL)
    /// Collaborator failure.
    Internal,
}

impl ErrorCode {
    /// Get the gRPC status code for this error.
    #[must_use]
    pub const fn grpc_code(&self) -> Code {
        match self {
            Self::InvalidPrice
            | Self::InvalidQuantity
            | Self::InvalidOrderType
            | Self::InvalidArgument => Code::InvalidArgument,

            Self::AccessDenied => Code::PermissionDenied,

            Self::OrderNotFound | Self::MarketNotAvailable => Code::NotFound,

            Self::AlreadyCancelled | Self::CannotCancel | Self::InvalidStatus => {
                Code::FailedPrecondition
            }

            Self::Internal => Code::Internal,
        }
    }

    /// Get the HTTP status for this error.
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self.grpc_code() {
            Code::InvalidArgument => StatusCode::BAD_REQUEST,
            Code::PermissionDenied => StatusCode::FORBIDDEN,
            Code::NotFound => StatusCode::NOT_FOUND,
            Code::FailedPrecondition => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error reason string (for gRPC `ErrorInfo` and JSON bodies).
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidPrice => "INVALID_PRICE",
            Self::InvalidQuantity => "INVALID_QUANTITY",
            Self::InvalidOrderType => "INVALID_ORDER_TYPE",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::MarketNotAvailable => "MARKET_NOT_AVAILABLE",
            Self::AlreadyCancelled => "ALREADY_CANCELLED",
            Self::CannotCancel => "CANNOT_CANCEL",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// Boxed collaborator error carried by [`ServiceError::Internal`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of an orchestrator operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Price not strictly positive or unparsable.
    #[error("invalid price: {value}")]
    InvalidPrice {
        /// Rejected input as received.
        value: String,
    },

    /// Quantity not strictly positive or unparsable.
    #[error("invalid quantity: {value}")]
    InvalidQuantity {
        /// Rejected input as received.
        value: String,
    },

    /// Unknown order type token.
    #[error("invalid order type: '{token}'")]
    InvalidOrderType {
        /// Rejected token.
        token: String,
    },

    /// Missing or malformed field.
    #[error("invalid argument '{field}': {reason}")]
    InvalidArgument {
        /// Field name.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Caller is not allowed to act on the resource.
    #[error("access denied")]
    AccessDenied,

    /// No order with that id.
    #[error("order {order_id} not found")]
    OrderNotFound {
        /// Requested id.
        order_id: OrderId,
    },

    /// Oracle says the market is absent or not accessible.
    #[error("market {market_id} is not available")]
    MarketNotAvailable {
        /// Requested market.
        market_id: MarketId,
    },

    /// Order is already cancelled.
    #[error("order is already cancelled")]
    AlreadyCancelled,

    /// Order is filled or rejected.
    #[error("order cannot be cancelled in status {status}")]
    CannotCancel {
        /// Current status.
        status: OrderStatus,
    },

    /// Order is in a status no operation can act on.
    #[error("order is in invalid status {status}")]
    InvalidStatus {
        /// Current status.
        status: OrderStatus,
    },

    /// A collaborator failed. The message stays generic; the cause is kept
    /// as the error source for logs.
    #[error("internal error")]
    Internal {
        /// Underlying failure.
        #[source]
        source: BoxError,
    },
}

impl ServiceError {
    /// Missing or malformed field.
    #[must_use]
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a collaborator failure.
    #[must_use]
    pub fn internal(source: impl Into<BoxError>) -> Self {
        Self::Internal {
            source: source.into(),
        }
    }

    /// Get the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidPrice { .. } => ErrorCode::InvalidPrice,
            Self::InvalidQuantity { .. } => ErrorCode::InvalidQuantity,
            Self::InvalidOrderType { .. } => ErrorCode::InvalidOrderType,
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
            Self::AccessDenied => ErrorCode::AccessDenied,
            Self::OrderNotFound { .. } => ErrorCode::OrderNotFound,
            Self::MarketNotAvailable { .. } => ErrorCode::MarketNotAvailable,
            Self::AlreadyCancelled => ErrorCode::AlreadyCancelled,
            Self::CannotCancel { .. } => ErrorCode::CannotCancel,
            Self::InvalidStatus { .. } => ErrorCode::InvalidStatus,
            Self::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Whether the caller may retry the same request. Only collaborator
    /// failures are transient.
    #[must_use]
    pub const fn retryable(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Get the HTTP status.
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        self.code().http_status()
    }

    /// Structured key/value context for error bodies.
    #[must_use]
    pub fn details(&self) -> HashMap<String, String> {
        let mut details = HashMap::new();
        match self {
            Self::InvalidPrice { value } | Self::InvalidQuantity { value } => {
                details.insert("value".to_string(), value.clone());
            }
            Self::InvalidOrderType { token } => {
                details.insert("order_type".to_string(), token.clone());
            }
            Self::InvalidArgument { field, .. } => {
                details.insert("field".to_string(), field.clone());
            }
            Self::OrderNotFound { order_id } => {
                details.insert("order_id".to_string(), order_id.to_string());
            }
            Self::MarketNotAvailable { market_id } => {
                details.insert("market_id".to_string(), market_id.to_string());
            }
            Self::CannotCancel { status } | Self::InvalidStatus { status } => {
                details.insert("status".to_string(), status.to_string());
            }
            Self::Internal { .. } => {
                details.insert("retryable".to_string(), "true".to_string());
            }
            Self::AccessDenied | Self::AlreadyCancelled => {}
        }
        details
    }

    /// Convert to a tonic Status with rich error details, for callers that
    /// serve these operations over gRPC.
    #[must_use]
    pub fn to_status(&self) -> tonic::Status {
        let mut details = ErrorDetails::new();
        let code = self.code();
        let message = self.to_string();

        details.set_error_info(code.reason(), ERROR_DOMAIN, self.details());

        match self {
            Self::InvalidPrice { .. } => {
                details.add_bad_request_violation("price", &message);
            }
            Self::InvalidQuantity { .. } => {
                details.add_bad_request_violation("quantity", &message);
            }
            Self::InvalidOrderType { .. } => {
                details.add_bad_request_violation("order_type", &message);
            }
            Self::InvalidArgument { field, .. } => {
                details.add_bad_request_violation(field.clone(), &message);
            }
            Self::AlreadyCancelled | Self::CannotCancel { .. } | Self::InvalidStatus { .. } => {
                details.add_precondition_failure_violation("STATUS", code.reason(), &message);
            }
            _ => {}
        }

        tonic::Status::with_error_details(code.grpc_code(), message, details)
    }

    /// Convert to an HTTP-compatible error response.
    #[must_use]
    pub fn to_http_response(&self) -> HttpErrorResponse {
        let code = self.code();
        HttpErrorResponse {
            code: code.reason().to_string(),
            message: self.to_string(),
            grpc_code: code.grpc_code() as i32,
            details: self.details(),
        }
    }
}

impl From<OrderError> for ServiceError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InvalidPrice { value } => Self::InvalidPrice {
                value: value.to_string(),
            },
            OrderError::InvalidQuantity { value } => Self::InvalidQuantity {
                value: value.to_string(),
            },
            OrderError::InvalidOrderType { token } => Self::InvalidOrderType { token },
            OrderError::InvalidOrderStatus { token } => {
                Self::invalid_argument("status", format!("unknown status '{token}'"))
            }
            OrderError::AlreadyCancelled => Self::AlreadyCancelled,
            OrderError::CannotCancel { status } => Self::CannotCancel { status },
            OrderError::InvalidStatus { status } => Self::InvalidStatus { status },
            err @ (OrderError::InvalidStateTransition { .. } | OrderError::Storage { .. }) => {
                Self::internal(err)
            }
        }
    }
}

/// HTTP-compatible error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpErrorResponse {
    /// Error code string.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// gRPC status code (for compatibility).
    pub grpc_code: i32,
    /// Additional details.
    pub details: HashMap<String, String>,
}
