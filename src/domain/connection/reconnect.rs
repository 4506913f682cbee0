//! Advice-driven reconnection policy.
//!
//! Decides what to do after the transport closes or a control exchange
//! fails. The decision is pure; the connection actor carries it out.
//!
//! | Advice              | Action                                |
//! |---------------------|---------------------------------------|
//! | none recorded       | bounded reconnect after the backoff   |
//! | `reconnect: none`   | stop                                  |
//! | `reconnect: handshake` | resend a handshake immediately     |
//! | `reconnect: retry`  | bounded reconnect after the backoff   |
//!
//! The backoff is a fixed delay, not exponential.

use std::time::Duration;

use crate::domain::message::{Advice, Reconnect};

/// Bounds for automatic reconnection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Attempts before automatic reconnection stops.
    ///
    /// Default: 5
    pub max_attempts: u32,

    /// Fixed delay before each attempt.
    ///
    /// Default: 2 seconds
    pub backoff: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_secs(2),
        }
    }
}

/// What the connection should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectAction {
    /// The server asked the client to stay away.
    Stop,
    /// Send a fresh handshake right away.
    Handshake { attempt: u32 },
    /// Reconnect after `delay`.
    Schedule { attempt: u32, delay: Duration },
    /// The attempt cap was reached; the counter has been reset and the
    /// caller must reconnect explicitly.
    GiveUp,
}

/// Attempt counter governed by a [`ReconnectPolicy`].
#[derive(Debug, Clone)]
pub struct ReconnectTracker {
    policy: ReconnectPolicy,
    attempts: u32,
}

impl ReconnectTracker {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
        }
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Forgets previous attempts, after a successful open or handshake.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Decides the next step from the advice being consumed.
    ///
    /// The caller hands over the advice by value: once decided on, it must
    /// not be applied again.
    pub fn decide(&mut self, advice: Option<Advice>) -> ReconnectAction {
        match advice.map(|a| a.reconnect) {
            Some(Reconnect::None) => ReconnectAction::Stop,
            Some(Reconnect::Handshake) => match self.next_attempt() {
                Some(attempt) => ReconnectAction::Handshake { attempt },
                None => ReconnectAction::GiveUp,
            },
            Some(Reconnect::Retry) | None => match self.next_attempt() {
                Some(attempt) => ReconnectAction::Schedule {
                    attempt,
                    delay: self.policy.backoff,
                },
                None => ReconnectAction::GiveUp,
            },
        }
    }

    fn next_attempt(&mut self) -> Option<u32> {
        if self.attempts >= self.policy.max_attempts {
            self.attempts = 0;
            return None;
        }
        self.attempts += 1;
        Some(self.attempts)
    }
}

impl Default for ReconnectTracker {
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}
