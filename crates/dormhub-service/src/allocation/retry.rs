//! Bounded retry with exponential backoff for contended transactions.
//!
//! Only [`ErrorKind::Conflict`](dormhub_core::error::ErrorKind::Conflict)
//! is retried. A pending assignment is a successful outcome and never
//! reaches this layer as an error.

use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use dormhub_core::config::AllocationConfig;
use dormhub_core::error::{AppError, ErrorKind};

/// Attempt budget and backoff unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy. At least one attempt is always made.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Build the policy from `[allocation]` settings.
    pub fn from_config(config: &AllocationConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_backoff_ms),
        )
    }

    /// Delay after failed attempt `attempt` (1-based): `2^attempt` units.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }

    /// Run `attempt_fn` until it succeeds, fails with a non-contention
    /// error, or the budget is spent.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt_fn: F) -> Result<T, AppError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let mut attempt = 1;
        loop {
            match attempt_fn().await {
                Ok(value) => {
                    if attempt > 1 {
                        info!(operation, attempt, "Succeeded after contention");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_contention() && attempt < self.max_attempts => {
                    let delay = self.backoff(attempt);
                    warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transaction contention, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) if err.is_contention() => {
                    warn!(operation, attempts = attempt, error = %err, "Retry budget exhausted");
                    return Err(AppError::with_source(
                        ErrorKind::Conflict,
                        format!(
                            "{operation} failed after {attempt} attempts, please retry registration: {}",
                            err.message
                        ),
                        err,
                    ));
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&AllocationConfig::default())
    }
}
