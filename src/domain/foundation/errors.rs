//! Error types for the protocol layer.

use thiserror::Error;

/// Ways a wildcard expansion request can be malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WildcardError {
    /// A wildcard pattern was expanded without a segment.
    #[error("wildcard pattern requires a segment")]
    MissingSegment,

    /// The segment does not fit the pattern: a segment given to a concrete
    /// name, or a multi-segment value given to a single-segment wildcard.
    #[error("segment does not match the wildcard arity of the pattern")]
    ArityMismatch,
}

/// Errors reported by a transport adapter.
///
/// Opaque to the protocol layer beyond the not-connected case, which is
/// surfaced to callers as [`FayeError::NotConnected`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("transport is not connected")]
    NotConnected,

    #[error("failed to open transport: {0}")]
    Open(String),

    #[error("failed to send on transport: {0}")]
    Send(String),

    #[error("failed to read from transport: {0}")]
    Receive(String),

    #[error("transport closed")]
    Closed,
}

/// Errors surfaced by the Bayeux client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FayeError {
    /// The operation needs a live transport.
    #[error("not connected")]
    NotConnected,

    /// A non-handshake message was built before the server assigned an identity.
    #[error("clientId missing for message on channel '{channel}'")]
    ClientIdMissing { channel: String },

    #[error("invalid wildcard usage: {0}")]
    InvalidWildcardUsage(#[from] WildcardError),

    #[error("invalid channel name '{0}'")]
    InvalidChannelName(String),

    /// Inbound bytes were not valid protocol JSON.
    #[error("failed to decode message: {0}")]
    DecodeFailure(String),

    #[error("transport error: {0}")]
    Transport(TransportError),

    /// The connection task has stopped and no longer accepts commands.
    #[error("client has shut down")]
    ClientShutDown,
}

impl From<TransportError> for FayeError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NotConnected => FayeError::NotConnected,
            other => FayeError::Transport(other),
        }
    }
}

impl From<serde_json::Error> for FayeError {
    fn from(err: serde_json::Error) -> Self {
        FayeError::DecodeFailure(err.to_string())
    }
}
