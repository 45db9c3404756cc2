//! Application Layer
//!
//! The application layer orchestrates domain logic through use cases.
//! It defines:
//!
//! - **Context**: per-request identity, deadline and cancellation
//! - **Ports**: Interfaces for interacting with external systems
//! - **Use Cases**: Application-specific business rules
//! - **Services**: The orchestrator facade over the use cases
//! - **DTOs**: Data transfer objects for API boundaries

pub mod context;
pub mod dto;
pub mod ports;
pub mod services;
pub mod use_cases;

pub use context::RequestContext;
pub use dto::*;
pub use ports::*;
pub use services::OrderOrchestrator;
pub use use_cases::*;
