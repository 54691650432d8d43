//! Retry utilities for transient fetch failures.
//!
//! Provides exponential backoff retry logic for conditions that may clear on
//! their own: network-level failures, 429 throttling, and 5xx responses.
//! Everything else (404, parse failures, unsupported operations) is
//! propagated immediately without retrying.

use std::future::Future;
use std::time::Duration;

use crate::error::ScrapeError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable:
/// - [`ScrapeError::Network`] — connection reset, timeout, DNS failure.
/// - [`ScrapeError::UnexpectedStatus`] with 429 or any 5xx — storefronts
///   throttle and shed load with both.
///
/// Everything else is returned immediately: a 404 stays a 404, and parse
/// or dispatch errors cannot be fixed by refetching.
fn is_retriable(err: &ScrapeError) -> bool {
    match err {
        ScrapeError::Network { .. } => true,
        ScrapeError::UnexpectedStatus { status, .. } => {
            *status == 429 || (500..=599).contains(status)
        }
        _ => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient
/// errors.
///
/// On a retriable error the function sleeps for
/// `backoff_base_secs * 2^attempt` seconds and tries again, up to
/// `max_retries` additional attempts after the first try. If all retries
/// are exhausted the last error is returned. Non-retriable errors are
/// returned immediately without sleeping.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScrapeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScrapeError>>,
{
    let mut last_err;
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                last_err = err;
            }
        }

        // Exponential backoff: base * 2^attempt seconds, saturating on
        // extreme configs.
        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %last_err,
            "transient fetch error — retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
