//! Retry with exponential back-off and jitter for provider HTTP calls.
//!
//! Only network-level trouble is retried here. Provider statuses such as
//! `REQUEST_DENIED` arrive in a successful HTTP response and are handled by the
//! search strategy, never by this loop.

use std::future::Future;
use std::time::Duration;

use crate::error::PlacesError;

const MAX_DELAY_MS: u64 = 30_000;

/// Whether repeating the request could plausibly change the outcome.
///
/// Timeouts, refused connections and 5xx answers qualify. A 4xx, a body we
/// cannot parse or a bad base URL will fail the same way every time.
pub(crate) fn is_retriable(err: &PlacesError) -> bool {
    let PlacesError::Http(http) = err else {
        return false;
    };
    http.is_timeout()
        || http.is_connect()
        || http.status().is_some_and(|code| code.is_server_error())
}

/// Un-jittered wait before retry number `retry` (1-based), capped at 30 s.
fn base_delay_ms(backoff_base_ms: u64, retry: u32) -> u64 {
    let doublings = retry.saturating_sub(1).min(10);
    backoff_base_ms
        .saturating_mul(1u64 << doublings)
        .min(MAX_DELAY_MS)
}

/// Scales `delay_ms` by a random factor in `[0.75, 1.25)`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn jittered(delay_ms: u64) -> Duration {
    let factor = 0.75 + rand::random::<f64>() / 2.0;
    Duration::from_millis((delay_ms as f64 * factor) as u64)
}

/// Awaits `request` until it succeeds, fails permanently, or `max_retries`
/// extra attempts have been spent.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut request: F,
) -> Result<T, PlacesError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlacesError>>,
{
    let mut retry = 0u32;
    loop {
        let err = match request().await {
            Ok(value) => return Ok(value),
            Err(err) if retry >= max_retries || !is_retriable(&err) => return Err(err),
            Err(err) => err,
        };
        retry += 1;
        let wait = jittered(base_delay_ms(backoff_base_ms, retry));
        tracing::warn!(
            retry,
            max_retries,
            wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "places request failed, backing off"
        );
        tokio::time::sleep(wait).await;
    }
}
