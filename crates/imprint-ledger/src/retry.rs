//! Exponential backoff for idempotent relay reads.
//!
//! Only [`ProviderError::Unavailable`] is retried. Rejections are final.
//! Transaction submission never goes through here: a resent submission
//! could execute twice.

use std::future::Future;
use std::time::Duration;

use crate::provider::ProviderError;

/// Backoff schedule: `base_delay * 2^attempt` between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    /// 200ms, 400ms, 800ms.
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Run `f` until it succeeds, fails permanently, or retries run out.
pub(crate) async fn retry_transient<T, F, Fut>(
    policy: RetryPolicy,
    operation: &str,
    f: F,
) -> Result<T, ProviderError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                let delay = policy.delay(attempt);
                tracing::warn!(
                    operation,
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    "relay request failed, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn default_schedule_doubles() {
        let p = RetryPolicy::default();
        assert_eq!(p.delay(0), Duration::from_millis(200));
        assert_eq!(p.delay(1), Duration::from_millis(400));
        assert_eq!(p.delay(2), Duration::from_millis(800));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_retries_on_unavailable() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result: Result<(), _> = retry_transient(RetryPolicy::default(), "test", || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::unavailable("down"))
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn rejection_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result: Result<(), _> = retry_transient(RetryPolicy::default(), "test", || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::rejected("no"))
            }
        })
        .await;
        assert_eq!(result, Err(ProviderError::rejected("no")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result = retry_transient(RetryPolicy::default(), "test", || {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ProviderError::unavailable("blip"))
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
