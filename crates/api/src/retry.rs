// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bounded retry of operations that lost a concurrency race.
//!
//! Only [`CoreError::ConcurrencyConflict`] is retried. Every engine
//! operation is a single all-or-nothing unit of work, so running it again
//! after a conflict is safe. Business failures are returned at once.

use std::time::Duration;
use tracing::{debug, warn};
use trip_queue::CoreError;

/// Default number of retries after the first attempt.
pub const DEFAULT_CONFLICT_RETRIES: u32 = 3;

/// How often and how patiently to retry a conflicting operation.
///
/// # Default Values
///
/// - `max_retries`: 3
/// - `initial_delay`: 5ms
/// - `max_delay`: 100ms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Pause before the first retry.
    pub initial_delay: Duration,
    /// Cap for the doubling pause.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_CONFLICT_RETRIES,
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// A policy with the default delays and `max_retries` retries.
    #[must_use]
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Pause before retry number `attempt` (zero-based), doubling each time
    /// and capped at `max_delay`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor: u32 = 1_u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Runs `operation`, repeating it while it fails with a concurrency
    /// conflict and retries remain.
    ///
    /// # Errors
    ///
    /// Returns the first non-retryable error, or the last conflict once the
    /// retries are used up.
    pub fn run<T, F>(&self, mut operation: F) -> Result<T, CoreError>
    where
        F: FnMut() -> Result<T, CoreError>,
    {
        let mut attempt: u32 = 0;
        loop {
            match operation() {
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    let delay: Duration = self.delay_for_attempt(attempt);
                    debug!(attempt, delay_ms = delay.as_millis(), error = %err, "Retrying after conflict");
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    attempt += 1;
                }
                Err(err) => {
                    if err.is_retryable() {
                        warn!(attempts = attempt + 1, error = %err, "Conflict retries exhausted");
                    }
                    return Err(err);
                }
                Ok(value) => return Ok(value),
            }
        }
    }
}
