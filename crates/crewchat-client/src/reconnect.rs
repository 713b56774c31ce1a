//! Reconnect backoff for the realtime channel.
//!
//! The channel owner drives a [`ReconnectSchedule`]: ask for the next
//! delay before each attempt, call [`ReconnectSchedule::reset`] after a
//! successful handshake. While disconnected the frontend falls back to
//! the HTTP surface; a pending send stays pending across the gap (see
//! [`crate::reconcile`]).

use std::time::Duration;

/// Backoff configuration: exponential growth from `base_delay`, capped
/// at `max_delay`, giving up after `max_attempts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Attempts before giving up entirely.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_attempts: 10,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before attempt number `attempt` (0-based), or `None` once
    /// the attempt budget is exhausted.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let factor = 2u32.saturating_pow(attempt);
        Some(self.base_delay.saturating_mul(factor).min(self.max_delay))
    }
}

/// Mutable retry state over a [`ReconnectPolicy`].
#[derive(Debug, Clone)]
pub struct ReconnectSchedule {
    policy: ReconnectPolicy,
    attempt: u32,
}

impl ReconnectSchedule {
    /// Creates a fresh schedule.
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    /// Delay to wait before the next attempt, or `None` when the budget
    /// is spent. Advances the attempt counter.
    pub fn next_delay(&mut self) -> Option<Duration> {
        let delay = self.policy.delay_for(self.attempt)?;
        self.attempt += 1;
        Some(delay)
    }

    /// Attempts consumed so far.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    /// Resets after a successful handshake.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

impl Default for ReconnectSchedule {
    fn default() -> Self {
        Self::new(ReconnectPolicy::default())
    }
}
