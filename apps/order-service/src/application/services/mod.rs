//! Application Services
//!
//! Facades that bundle the use cases for the inbound adapters.

mod order_orchestrator;

pub use order_orchestrator::OrderOrchestrator;
