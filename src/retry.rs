//! Retry budget and backoff schedule for the request executor.

use std::time::Duration;

use rand::Rng;

use crate::errors::TransportError;
use crate::types::ErrorBody;

/// How one logical request is retried.
///
/// Attempt `n` (zero-based) sleeps `min(base_delay * 2^n, max_delay)` plus
/// a small random jitter before the next try. The budget counts attempts,
/// not sleeps: `max_attempts = 5` means at most five requests on the wire.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Upper bound on the jitter added to each sleep. Zero disables it.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(20),
            jitter: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// The sleep inserted after failed attempt `attempt` (zero-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(31);
        let delay = self.base_delay.saturating_mul(factor).min(self.max_delay);
        if self.jitter.is_zero() {
            return delay;
        }
        let jitter_ms = rand::thread_rng().gen_range(0..=self.jitter.as_millis() as u64);
        delay + Duration::from_millis(jitter_ms)
    }
}

/// Outcome of a single request attempt. The executor's retry driver
/// branches on the tag; only `Transport` is retried.
#[derive(Debug)]
pub(crate) enum Attempt<T> {
    Success(T),
    Transport(TransportError),
    Rejected(ErrorBody),
}
