//! Retry policy and executor

use crate::error::Result;
use crate::types::BackoffType;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// How many times to try an operation and how long to wait in between
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub delay: Duration,
    /// Growth of the delay across retries
    pub backoff: BackoffType,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(4, Duration::from_millis(1000))
    }
}

impl RetryPolicy {
    /// Constant delay between a fixed number of attempts
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            backoff: BackoffType::Constant,
            max_delay: Duration::from_secs(60),
        }
    }

    /// A single attempt, never retried
    pub fn no_retry() -> Self {
        Self::fixed(1, Duration::ZERO)
    }

    /// Set backoff growth
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffType, max_delay: Duration) -> Self {
        self.backoff = backoff;
        self.max_delay = max_delay;
        self
    }

    /// Number of attempts actually made; zero is treated as one
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after the given failed attempt (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let retry_index = attempt.saturating_sub(1);
        let delay = match self.backoff {
            BackoffType::Constant => self.delay,
            BackoffType::Linear => self.delay.saturating_mul(retry_index + 1),
            BackoffType::Exponential => self.delay.saturating_mul(2u32.saturating_pow(retry_index)),
        };

        std::cmp::min(delay, self.max_delay)
    }
}

/// Run `op` under `policy`
///
/// `op` receives the 1-based attempt number. Non-retryable errors are returned
/// immediately; once attempts are exhausted the last error is returned.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("Succeeded on attempt {}/{}", attempt, max_attempts);
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "{}, attempt {}/{}, retrying in {:?}",
                    e, attempt, max_attempts, delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    warn!("{}, giving up after {} attempts", e, attempt);
                }
                return Err(e);
            }
        }
    }
}
