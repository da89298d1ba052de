//! Bounded retry around a per-attempt operation.
//!
//! The operation receives the attempt number (0-indexed) and reports a
//! [`RetryAction`]; [`retry_bounded`] decides whether another attempt runs.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::PlatformError;

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Pause between attempts. Zero retries immediately.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::immediate(5)
    }
}

/// Result of a single attempt.
#[derive(Debug)]
pub enum RetryAction<T> {
    /// Operation succeeded.
    Success(T),
    /// Operation failed and may be attempted again.
    Retry(PlatformError),
}

/// Run `operation` until it succeeds or the policy's attempts are used up.
/// The last error is returned on exhaustion.
pub async fn retry_bounded<F, Fut, T>(
    policy: &RetryPolicy,
    op_name: &'static str,
    mut operation: F,
) -> Result<T, PlatformError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = RetryAction<T>>,
{
    let attempts = policy.attempts();
    let mut attempt = 0;
    loop {
        match operation(attempt).await {
            RetryAction::Success(value) => {
                debug!(op = op_name, attempt = attempt + 1, "Attempt succeeded");
                return Ok(value);
            }
            RetryAction::Retry(err) => {
                attempt += 1;
                if attempt >= attempts {
                    return Err(err);
                }
                warn!(
                    op = op_name,
                    attempt,
                    max = attempts,
                    error = %err,
                    "Attempt failed, retrying"
                );
                if !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }
}
