use std::time::Duration;

/// How a call retries after transient failures.
///
/// `max_retries` counts retries on top of the initial attempt, so a call
/// makes at most `max_retries + 1` attempts. Rate-limit waits draw from
/// the same budget as transport retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay between retries, and the fallback when a 429 carries no usable `Retry-After`.
    pub fixed_delay: Duration,
    /// Per-attempt transport timeout.
    pub connection_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            fixed_delay: Duration::from_secs(1),
            connection_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, fixed_delay: Duration, connection_timeout: Duration) -> Self {
        Self {
            max_retries,
            fixed_delay,
            connection_timeout,
        }
    }

    /// Total attempts a single call may make.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}
