//! Persistence Adapters
//!
//! Implementations of the domain repository traits.

pub mod in_memory;

pub use in_memory::InMemoryOrderRepository;
