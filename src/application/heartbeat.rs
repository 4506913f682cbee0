//! Periodic keep-alive ticks.
//!
//! The heartbeat only produces ticks; the connection actor turns each tick
//! into a transport ping. It runs while the transport is open and is
//! suspended whenever it closes.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Repeating timer posting an event every `interval`.
#[derive(Debug)]
pub struct Heartbeat {
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl Heartbeat {
    /// A zero interval disables the heartbeat.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            handle: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts ticking. The first tick fires one interval from now.
    ///
    /// A no-op while already running.
    pub fn resume<T, F>(&mut self, tx: mpsc::UnboundedSender<T>, make_event: F)
    where
        T: Send + 'static,
        F: Fn() -> T + Send + 'static,
    {
        if self.interval.is_zero() || self.is_running() {
            return;
        }

        let period = self.interval;
        self.handle = Some(tokio::spawn(async move {
            let mut ticks = time::interval_at(time::Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if tx.send(make_event()).is_err() {
                    break;
                }
            }
        }));
    }

    /// Stops ticking. Idempotent.
    pub fn suspend(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Stops and starts again, so the next tick is a full interval away.
    pub fn restart<T, F>(&mut self, tx: mpsc::UnboundedSender<T>, make_event: F)
    where
        T: Send + 'static,
        F: Fn() -> T + Send + 'static,
    {
        self.suspend();
        self.resume(tx, make_event);
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.suspend();
    }
}
