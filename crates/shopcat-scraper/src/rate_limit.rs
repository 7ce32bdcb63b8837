//! Backoff for storefront requests that hit a throttle or a flaky edge.
//!
//! A storefront answers with 429 when it throttles, and its CDN with 5xx when
//! it hiccups. Both usually clear within seconds, as do dropped connections.
//! A 404, any other 4xx, or a body that is not a listing will not improve on
//! a second try and is returned at once.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

fn is_transient(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

/// `backoff_base_secs * 2^retry`, saturating. `retry` counts from 0.
fn backoff_delay(backoff_base_secs: u64, retry: u32) -> Duration {
    Duration::from_secs(backoff_base_secs.saturating_mul(1u64 << retry.min(62)))
}

/// Runs `request` until it succeeds, fails with a non-transient error, or has
/// been retried `max_retries` times; the last error is returned in the latter
/// two cases.
///
/// With a base of 2 s the waits before retries 1, 2, 3 are 2 s, 4 s, 8 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut request: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut retry = 0u32;
    loop {
        let err = match request().await {
            Ok(value) => return Ok(value),
            Err(err) if retry >= max_retries || !is_transient(&err) => return Err(err),
            Err(err) => err,
        };

        let delay = backoff_delay(backoff_base_secs, retry);
        retry += 1;
        tracing::warn!(
            retry,
            max_retries,
            delay_secs = delay.as_secs(),
            error = %err,
            "storefront request failed transiently, backing off"
        );
        tokio::time::sleep(delay).await;
    }
}
