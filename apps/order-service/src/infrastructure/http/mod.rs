//! HTTP/REST API adapter.
//!
//! Inbound adapter exposing the order operations as JSON endpoints.

mod controller;
mod request;
mod response;

pub use controller::{AppState, TIMEOUT_HEADER, TRACE_ID_HEADER, USER_ID_HEADER, create_router};
pub use request::*;
pub use response::*;
