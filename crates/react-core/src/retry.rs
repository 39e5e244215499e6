//! Timeouts and bounded retries around external calls
//!
//! Every LLM and tool call goes through [`call_with_retry`]. An attempt that
//! exceeds its deadline, or fails with a retryable error, is retried with
//! exponential back-off. Cancellation is raced against both the call and the
//! back-off sleep.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{AgentError, Result};

/// Bounded retry with exponential back-off
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Back-off before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let shift = retry.saturating_sub(1).min(20);
        self.initial_backoff
            .saturating_mul(1u32 << shift)
            .min(self.max_backoff)
    }

    const fn attempts(&self) -> u32 {
        if self.max_attempts == 0 { 1 } else { self.max_attempts }
    }
}

/// Run `call` under `timeout`, retrying per `policy`
///
/// Returns [`AgentError::Cancelled`] as soon as `cancel` fires and
/// [`AgentError::ExternalServiceTimeout`] once every attempt has timed out.
pub async fn call_with_retry<T, F, Fut>(
    service: &str,
    policy: &RetryPolicy,
    timeout: Duration,
    cancel: &CancellationToken,
    mut call: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;
        if cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(AgentError::Cancelled),
            res = tokio::time::timeout(timeout, call()) => res,
        };

        let err = match result {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => err,
            Err(_elapsed) => AgentError::Timeout(timeout),
        };

        if !err.is_retryable() {
            return Err(err);
        }

        if attempt >= max_attempts {
            return Err(match err {
                AgentError::Timeout(_) => AgentError::ExternalServiceTimeout {
                    service: service.to_string(),
                    attempts: max_attempts,
                },
                other => other,
            });
        }

        let wait = policy.backoff(attempt);
        tracing::warn!(
            service,
            attempt,
            max_attempts,
            backoff_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "Retrying external call"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(AgentError::Cancelled),
            () = tokio::time::sleep(wait) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
        }
    }

    #[test]
    fn test_backoff_is_exponential_and_capped() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(350),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(350));
    }

    #[tokio::test]
    async fn test_succeeds_after_retryable_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let out = call_with_retry(
            "llm",
            &fast_policy(3),
            Duration::from_secs(1),
            &CancellationToken::new(),
            || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(AgentError::ProviderUnavailable("down".into()))
                    } else {
                        Ok("ok")
                    }
                }
            },
        )
        .await
        .unwrap();

        assert_eq!(out, "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_timeouts_are_fatal() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let err = call_with_retry(
            "llm",
            &fast_policy(2),
            Duration::from_millis(10),
            &CancellationToken::new(),
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok::<_, AgentError>(())
                }
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            AgentError::ExternalServiceTimeout { ref service, attempts: 2 } if service == "llm"
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_error_returns_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let err = call_with_retry(
            "tool",
            &fast_policy(5),
            Duration::from_secs(1),
            &CancellationToken::new(),
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(AgentError::ToolExecution("bad input".into())) }
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AgentError::ToolExecution(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_call() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let err = call_with_retry(
            "llm",
            &fast_policy(3),
            Duration::from_secs(30),
            &cancel,
            || async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, AgentError>(())
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AgentError::Cancelled));
    }
}
