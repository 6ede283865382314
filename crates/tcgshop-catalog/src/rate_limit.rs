//! Retry with exponential back-off and jitter for catalog API calls.
//!
//! Transient failures (429, network errors, 5xx) are retried; anything that
//! would fail the same way again is returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::CatalogError;

/// Upper bound on a single back-off sleep.
const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` if `err` is worth retrying after a back-off delay.
///
/// Retriable:
/// - [`CatalogError::RateLimited`]: HTTP 429.
/// - [`CatalogError::Http`]: timeout or connection failure.
/// - [`CatalogError::UnexpectedStatus`] with a 5xx status.
///
/// Everything else (404, 4xx, API error envelopes, malformed bodies, the
/// pagination guard) is returned as-is.
pub(crate) fn is_retriable(err: &CatalogError) -> bool {
    match err {
        CatalogError::RateLimited { .. } => true,
        CatalogError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        CatalogError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        CatalogError::Deserialize { .. }
        | CatalogError::NotFound { .. }
        | CatalogError::Api { .. }
        | CatalogError::NotAnItem { .. }
        | CatalogError::InvalidBaseUrl { .. }
        | CatalogError::PaginationLimit { .. } => false,
    }
}

/// Back-off before retry number `attempt` (1-based), before jitter.
///
/// `backoff_base_ms * 2^(attempt-1)`, raised to the server's `Retry-After`
/// hint on a 429, capped at [`MAX_DELAY_MS`].
fn base_delay_ms(err: &CatalogError, attempt: u32, backoff_base_ms: u64) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let hinted = match err {
        CatalogError::RateLimited { retry_after_secs } => {
            computed.max(retry_after_secs.saturating_mul(1_000))
        }
        _ => computed,
    };
    hinted.min(MAX_DELAY_MS)
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors.
///
/// With `backoff_base_ms = 500` the sleeps are roughly 500 ms, 1 s, 2 s,
/// each scaled by a random factor in `[0.75, 1.25)`. A `Retry-After` hint
/// on a 429 raises the delay but never above 30 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let capped = base_delay_ms(&err, attempt, backoff_base_ms);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient catalog API error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
