//! Bounded retry with exponential backoff
//!
//! Retries only errors classified as transient rate limiting; quota
//! exhaustion and everything else return to the caller on the first
//! attempt. The delay doubles after every rate-limited attempt.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::LlmError;

/// Retry schedule for one category of model call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,

    /// Delay before the first re-attempt; doubles each time after
    pub initial_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy with an explicit attempt budget and starting delay
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
        }
    }
}

impl Default for RetryPolicy {
    /// Three attempts starting at a two second delay
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
        }
    }
}

/// Run `operation` under `policy`, sleeping between rate-limited attempts
///
/// Outcomes:
///
/// - first `Ok` is returned immediately
/// - quota exhaustion returns the error without any retry
/// - rate limiting sleeps and re-attempts until the budget runs out, then
///   returns the last rate-limit error
/// - any other error returns on the attempt that produced it
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut delay = policy.initial_delay;

    for attempt in 0..policy.max_attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_quota_exhausted() => {
                // Hard ceiling; retrying cannot help within the billing period
                return Err(err);
            }
            Err(err) if err.is_rate_limited() => {
                if attempt + 1 >= policy.max_attempts {
                    return Err(err);
                }
                warn!(
                    "Model rate limited (attempt {}/{}), backing off for {}ms...",
                    attempt + 1,
                    policy.max_attempts,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(err) => return Err(err),
        }
    }

    // Reachable only with a zero-attempt policy
    Err(LlmError::RetriesExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn rate_limit_error() -> LlmError {
        LlmError::Api {
            status: 429,
            message: "Too many requests".to_string(),
            body: None,
        }
    }

    fn quota_error() -> LlmError {
        LlmError::Api {
            status: 429,
            message: "You exceeded your current quota".to_string(),
            body: None,
        }
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = with_retry(RetryPolicy::default(), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, LlmError>("done")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let start = Instant::now();

        let policy = RetryPolicy::new(3, Duration::from_secs(2));
        let result = with_retry(policy, move || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(rate_limit_error())
                } else {
                    Ok("recovered")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 2s after the first failure, 4s after the second
        assert_eq!(start.elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_budget_exhausted() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let policy = RetryPolicy::new(3, Duration::from_secs(2));
        let result: Result<(), _> = with_retry(policy, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(rate_limit_error())
            }
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.is_rate_limited());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_quota_error_fails_fast() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = with_retry(RetryPolicy::default(), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(quota_error())
            }
        })
        .await;

        assert!(result.unwrap_err().is_quota_exhausted());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_errors_fail_fast() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = with_retry(RetryPolicy::default(), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(LlmError::Transport("connection refused".to_string()))
            }
        })
        .await;

        assert!(matches!(result.unwrap_err(), LlmError::Transport(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_attempt_policy() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        let result = with_retry(policy, || async { Ok::<(), LlmError>(()) }).await;
        // The operation never runs
        assert!(matches!(result.unwrap_err(), LlmError::RetriesExhausted));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_doubles_each_attempt() {
        let policy = RetryPolicy::new(4, Duration::from_millis(2500));
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let start = Instant::now();

        let result: Result<(), _> = with_retry(policy, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(rate_limit_error())
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // 2.5s + 5s + 10s between the four attempts
        assert_eq!(start.elapsed(), Duration::from_millis(17_500));
    }
}
