use std::future::Future;

use tracing::{error, warn};

use crate::config::DelayRange;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Slept between a failed attempt and the next one, never after the last.
    pub backoff: DelayRange,
}

#[derive(Debug)]
pub enum RetryOutcome<T> {
    Succeeded { value: T, attempts: u32 },
    /// Budget spent, or a non-retryable error cut it short.
    Exhausted { attempts: u32, last_error: Option<AppError> },
}

/// Run `attempt` up to `policy.max_attempts` times, stopping at the first `Ok`.
///
/// Retryable errors are logged and followed by a randomized backoff. Errors are
/// never returned; the caller decides what an exhausted budget means.
pub async fn retry_bounded<T, F, Fut>(policy: &RetryPolicy, label: &str, mut attempt: F) -> RetryOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;
    for n in 1..=policy.max_attempts {
        match attempt(n).await {
            Ok(value) => return RetryOutcome::Succeeded { value, attempts: n },
            Err(e) if e.is_retryable() => {
                warn!(label, attempt = n, max = policy.max_attempts, "Attempt failed: {e}");
                last_error = Some(e);
                if n < policy.max_attempts {
                    policy.backoff.sleep().await;
                }
            }
            Err(e) => {
                error!(label, attempt = n, "Attempt failed with non-retryable error: {e}");
                return RetryOutcome::Exhausted { attempts: n, last_error: Some(e) };
            }
        }
    }
    RetryOutcome::Exhausted {
        attempts: policy.max_attempts,
        last_error,
    }
}
