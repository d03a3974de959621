//! Exponential backoff retry logic for LLM providers.

use std::future::Future;
use std::time::{Duration, Instant};

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::warn;

/// Attempt budget and delays for provider calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each attempt after.
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

/// Configuration: 3 total attempts, base 1s, max 30s.
impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.initial_interval,
            initial_interval: self.initial_interval,
            // No jitter: every wait is strictly longer than the one before.
            randomization_factor: 0.0,
            multiplier: 2.0,
            max_interval: self.max_interval,
            max_elapsed_time: None,
            start_time: Instant::now(),
            ..Default::default()
        }
    }
}

/// Retry an async operation with exponential backoff.
///
/// `attempt` is called up to `policy.max_attempts` times. Errors for which
/// `is_retryable` returns false are returned immediately, unchanged. When the
/// budget runs out, `wrap_exhausted` converts the last error.
pub async fn retry_with_backoff<T, E, Fut, F, R, W>(
    policy: &RetryPolicy,
    mut attempt: F,
    is_retryable: R,
    wrap_exhausted: W,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    W: FnOnce(E) -> E,
    E: std::fmt::Display,
{
    let mut backoff = policy.backoff();
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;

        let error = match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if !is_retryable(&error) {
            return Err(error);
        }

        if attempts >= max_attempts {
            return Err(wrap_exhausted(error));
        }

        if let Some(wait_duration) = backoff.next_backoff() {
            warn!(
                "{}. Retrying in {}ms... ({} attempts left)",
                error,
                wait_duration.as_millis(),
                max_attempts - attempts
            );
            tokio::time::sleep(wait_duration).await;
        }
    }
}
