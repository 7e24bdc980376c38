// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reconnection backoff policy.

use std::time::Duration;

/// Exponential backoff with an attempt ceiling.
///
/// Attempt `n` (starting at 1) waits `base_delay * 2^(n-1)`. Once `n` exceeds
/// `max_attempts` no further attempt is scheduled. There is no jitter term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay before the first reconnection attempt.
    pub base_delay: Duration,
    /// Maximum number of reconnection attempts.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy {
            base_delay: Duration::from_millis(1000),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Create a policy.
    pub fn new(base_delay: Duration, max_attempts: u32) -> Self {
        ReconnectPolicy {
            base_delay,
            max_attempts,
        }
    }

    /// Delay before attempt `attempt`, or `None` past the ceiling.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_attempts {
            return None;
        }

        let factor = 2u32.checked_pow(attempt - 1).unwrap_or(u32::MAX);
        Some(self.base_delay.checked_mul(factor).unwrap_or(Duration::MAX))
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
