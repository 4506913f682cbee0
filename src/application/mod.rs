//! Application layer - the connection actor and its public handle.
//!
//! [`FayeClient`] sends commands to a single task that owns the connection
//! state, the subscription registry and all timers.

mod actor;
mod client;
mod heartbeat;
mod plugin_chain;
mod registry;
mod subscription;
mod timer;

pub use client::{ClientOptions, FayeClient, FayeClientBuilder};
pub use heartbeat::Heartbeat;
pub use plugin_chain::PluginChain;
pub use registry::{Subscription, SubscriptionRegistry};
pub use subscription::SubscriptionHandle;
pub use timer::DelayedTask;
