//! Reconnection scheduling for the trade stream.

use std::time::Duration;

const BASE_DELAY_MS: u64 = 1_000;
const MAX_DELAY_MS: u64 = 30_000;

/// Delay before the Nth consecutive reconnection attempt:
/// 1s, 2s, 4s, ... capped at 30s. `failure_streak` is 1-based.
pub fn retry_delay(failure_streak: u32) -> Duration {
    let exp = failure_streak.saturating_sub(1);
    // 2^5 * 1000ms already exceeds the cap; stop shifting there so long
    // streaks cannot wrap the multiplication.
    if exp >= 5 {
        return Duration::from_millis(MAX_DELAY_MS);
    }
    Duration::from_millis((BASE_DELAY_MS << exp).min(MAX_DELAY_MS))
}

/// Tracks the consecutive-failure streak across open/close transitions.
#[derive(Debug, Default)]
pub struct ReconnectPolicy {
    failures: u32,
}

impl ReconnectPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unclean closures in the current streak.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Record a successful open; the next failure streak restarts at 1s.
    pub fn record_open(&mut self) {
        self.failures = 0;
    }

    /// Record an unclean closure and return the delay before the
    /// corresponding reconnection attempt.
    pub fn record_failure(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);
        retry_delay(self.failures)
    }
}
