//! Connection lifecycle and reconnection policy.

mod reconnect;
mod state;

pub use reconnect::{ReconnectAction, ReconnectPolicy, ReconnectTracker};
pub use state::ConnectionState;
