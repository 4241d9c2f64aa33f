//! Bounded retry with linear backoff for batch queries.

use crate::Result;
use crate::adapters::RetryPolicy;
use crate::error::CharScanError;
use std::future::Future;

/// Runs `operation` until it succeeds or `policy.max_attempts` is spent.
///
/// Between attempts the task sleeps `attempt * base_delay`. No sleep follows
/// the final failure. The last error is returned wrapped in
/// [`CharScanError::RetriesExhausted`].
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, what: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 1;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!("{} succeeded on attempt {}", what, attempt);
                }
                return Ok(value);
            }
            Err(error) if attempt >= policy.max_attempts => {
                tracing::error!("{} failed after {} attempts: {}", what, attempt, error);
                return Err(CharScanError::retries_exhausted(attempt, error));
            }
            Err(error) => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    "{} failed on attempt {}/{}: {}; retrying in {:?}",
                    what,
                    attempt,
                    policy.max_attempts,
                    error,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt = attempt.saturating_add(1);
            }
        }
    }
}
