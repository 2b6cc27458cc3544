//! Retry with exponential back-off and jitter for source adapters.
//!
//! Retries live inside the adapters, never in the fan-out: a source
//! that keeps failing after its own retries simply contributes nothing
//! to the merge.

use std::future::Future;
use std::time::Duration;

use crate::error::LookupError;

/// Returns `true` for errors worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection reset.
/// - HTTP 429 and 5xx: the source is throttling or briefly unwell.
///
/// **Not retriable (returned immediately):**
/// - [`LookupError::NotFound`] — the source answered; asking again
///   returns the same answer.
/// - [`LookupError::Deserialize`] — malformed response; retrying won't fix it.
/// - [`LookupError::Timeout`] — the per-source budget is spent.
/// - Any other 4xx status.
pub(crate) fn is_retriable(err: &LookupError) -> bool {
    match err {
        LookupError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        LookupError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        LookupError::NotFound { .. }
        | LookupError::Deserialize { .. }
        | LookupError::Timeout { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors.
///
/// The delay before the n-th retry is `backoff_base_ms * 2^(n-1)` with
/// ±25% jitter, capped at 30 s. Non-retriable errors are returned
/// immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, LookupError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LookupError>>,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
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
                    "transient source error — retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
