//! Bounded retry for flaky in-page actions.
//!
//! Pagination clicks and their verification fail transiently when the review
//! feed re-renders mid-action. Those are retried; protocol and session
//! failures mean the browser is gone and are propagated immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Returns `true` if `err` is a page-level failure worth another attempt.
///
/// - [`ScraperError::Navigation`]: the click landed but the page did not change.
/// - [`ScraperError::Script`]: an injected script threw or returned garbage.
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    matches!(
        err,
        ScraperError::Navigation { .. } | ScraperError::Script { .. }
    )
}

/// Executes `operation`, retrying retriable errors up to `max_retries` times.
///
/// Sleeps `backoff_base * 2^attempt` between attempts. With `max_retries = 1`
/// the operation runs at most twice. The last error is returned once retries
/// are exhausted.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base: Duration,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        let delay = backoff_base.saturating_mul(1u32 << attempt.min(16));
        tracing::warn!(
            attempt,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "page action failed, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn stale_page(page: u32) -> ScraperError {
        ScraperError::Navigation {
            page,
            reason: "content unchanged after click".to_owned(),
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, Duration::ZERO, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, ScraperError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_navigation_failure_then_succeeds() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(2, Duration::ZERO, || {
            let cc = Arc::clone(&cc);
            async move {
                let n = cc.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(stale_page(2))
                } else {
                    Ok::<u32, ScraperError>(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn propagates_last_error_after_exhausting_retries() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(1, Duration::ZERO, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScraperError>(ScraperError::Script {
                    context: "clicking next page".to_owned(),
                    reason: "node detached".to_owned(),
                })
            }
        })
        .await;
        // max_retries=1 → 2 total attempts
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
        assert!(matches!(result, Err(ScraperError::Script { .. })));
    }

    #[tokio::test]
    async fn does_not_retry_session_failure() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, Duration::ZERO, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, ScraperError>(ScraperError::Session("target crashed".to_owned()))
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ScraperError::Session(_))));
    }

    #[test]
    fn page_level_errors_are_retriable() {
        assert!(is_retriable(&stale_page(3)));
        assert!(!is_retriable(&ScraperError::Launch("no binary".to_owned())));
        assert!(!is_retriable(&ScraperError::SessionTimeout { limit_secs: 300 }));
    }
}
