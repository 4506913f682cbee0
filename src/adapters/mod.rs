//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the client to the outside world:
//! - `websocket` - Transport over tokio-tungstenite
//! - `transport` - In-memory transport for tests
//! - `plugins` - Outgoing message plugins

pub mod plugins;
pub mod transport;
pub mod websocket;

pub use plugins::{ExtFieldsPlugin, LoggingPlugin, SigningPlugin};
pub use transport::InMemoryTransport;
pub use websocket::WebSocketTransport;
