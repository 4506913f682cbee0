//! Transport adapters for testing.
//!
//! - `InMemoryTransport` - scripted, in-process transport for tests

mod in_memory;

pub use in_memory::InMemoryTransport;
