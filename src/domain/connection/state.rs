//! Connection lifecycle states.

use serde::Serialize;
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle of one logical Bayeux connection.
///
/// ```text
/// Idle -> Connecting -> Handshaking -> Connected
///                 \          |            |
///                  +--> Reconnecting <----+--> Disconnected
///                          |                       |
///                          +------> Connecting <---+
/// ```
///
/// An explicit disconnect returns to `Idle` from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Constructed or explicitly disconnected.
    #[default]
    Idle,
    /// Transport open requested.
    Connecting,
    /// Transport live, handshake sent.
    Handshaking,
    /// Handshake accepted; a clientId is held.
    Connected,
    /// Waiting out the backoff before the next connect attempt.
    Reconnecting,
    /// Transport lost and no automatic reconnect pending.
    Disconnected,
}

impl ConnectionState {
    /// True only while a server-assigned identity is held.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Handshaking => "handshaking",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Disconnected => "disconnected",
        };
        write!(f, "{}", s)
    }
}

impl StateMachine for ConnectionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConnectionState::*;
        if *target == Idle {
            return *self != Idle;
        }
        matches!(
            (self, target),
            (Idle, Connecting)
                | (Connecting, Handshaking)
                | (Connecting, Reconnecting)
                | (Connecting, Disconnected)
                | (Handshaking, Connected)
                | (Handshaking, Reconnecting)
                | (Handshaking, Disconnected)
                | (Connected, Handshaking)
                | (Connected, Reconnecting)
                | (Connected, Disconnected)
                | (Reconnecting, Connecting)
                | (Reconnecting, Disconnected)
                | (Disconnected, Connecting)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConnectionState::*;
        match self {
            Idle => vec![Connecting],
            Connecting => vec![Handshaking, Reconnecting, Disconnected, Idle],
            Handshaking => vec![Connected, Reconnecting, Disconnected, Idle],
            Connected => vec![Handshaking, Reconnecting, Disconnected, Idle],
            Reconnecting => vec![Connecting, Disconnected, Idle],
            Disconnected => vec![Connecting, Idle],
        }
    }
}
