//! Exponential backoff for transient feed fetch failures.

use std::future::Future;
use std::time::Duration;

use crate::error::IngestError;

/// Rate limiting (429) and network-level failures are worth another try.
/// Bad statuses, oversized bodies and parse errors are not.
fn is_retriable(err: &IngestError) -> bool {
    matches!(err, IngestError::RateLimited { .. } | IngestError::Http(_))
}

/// Run `operation`, retrying transient errors up to `max_retries` times.
///
/// The wait before retry `n` (0-based) is `backoff_base_secs * 2^n` seconds.
/// Non-retriable errors and the last error after exhausting retries are
/// returned as-is.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, IngestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, IngestError>>,
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

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient fetch error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
