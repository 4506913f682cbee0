//! Foundation module - Shared protocol primitives.
//!
//! Contains identifiers, the state machine trait, and error types
//! that form the vocabulary of the Bayeux client.

mod errors;
mod ids;
mod state_machine;

pub use errors::{FayeError, TransportError, WildcardError};
pub use ids::{ClientId, MessageId, MessageIdGenerator, SubscriptionId};
pub use state_machine::{InvalidTransition, StateMachine};
