//! Retry policy for provider I/O
//!
//! Re-runs a failing operation with exponential backoff clamped between a
//! minimum and maximum wait. The last failure is returned unchanged.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Exponential backoff retry policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first
    max_attempts: u32,
    multiplier: Duration,
    min_wait: Duration,
    max_wait: Duration,
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` of zero is treated as one
    pub fn new(
        max_attempts: u32,
        multiplier: Duration,
        min_wait: Duration,
        max_wait: Duration,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            multiplier,
            min_wait,
            max_wait: max_wait.max(min_wait),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait before the attempt following failed attempt `attempt` (0-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        let exponential = self.multiplier.saturating_mul(factor);
        exponential.clamp(self.min_wait, self.max_wait)
    }

    /// Run `operation` until it succeeds or attempts are exhausted
    ///
    /// `label` only identifies the operation in logs.
    pub async fn execute<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt + 1 < self.max_attempts => {
                    let wait = self.delay(attempt);
                    tracing::warn!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        label,
                        attempt + 1,
                        self.max_attempts,
                        e,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    /// 3 attempts, 1s multiplier, waits clamped to 4..=10 seconds
    fn default() -> Self {
        Self::new(
            3,
            Duration::from_secs(1),
            Duration::from_secs(4),
            Duration::from_secs(10),
        )
    }
}
