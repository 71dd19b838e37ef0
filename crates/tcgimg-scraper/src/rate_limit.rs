//! Request pacing and retry utilities.
//!
//! The site gets one request at a time with a fixed pause in between
//! ([`Pacer`]). A failed request is attempted exactly once unless the
//! client is configured with `max_retries > 0`, in which case transient
//! errors are retried with exponential backoff.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable errors:
/// - [`ScraperError::RateLimited`]: HTTP 429.
/// - [`ScraperError::Http`]: network-level failure (connection reset, timeout, etc.).
/// - [`ScraperError::UnexpectedStatus`] with a 5xx status.
///
/// Everything else (404, other 4xx, bad base URL) is returned immediately.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        ScraperError::NotFound { .. } | ScraperError::InvalidBaseUrl { .. } => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a retriable error the function sleeps for `backoff_base_secs * 2^attempt`
/// seconds and tries again, up to `max_retries` additional attempts after the
/// first try. If all retries are exhausted the last error is returned.
///
/// # Backoff schedule (example with `backoff_base_secs = 2`)
///
/// | Attempt | Sleep before next attempt |
/// |---------|--------------------------|
/// | 0 (initial) | none |
/// | 1 (first retry) | 2 × 2^0 = 2 s |
/// | 2 (second retry) | 2 × 2^1 = 4 s |
///
/// With `max_retries = 0` the operation runs exactly once.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
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

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %last_err,
            "transient fetch error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}

/// Spaces consecutive requests of one walk or table run. The first call to
/// [`Pacer::wait`] returns immediately; every later call sleeps for the
/// configured delay.
#[derive(Debug)]
pub(crate) struct Pacer {
    delay: Duration,
    primed: bool,
}

impl Pacer {
    pub(crate) fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            primed: false,
        }
    }

    pub(crate) async fn wait(&mut self) {
        if self.primed && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.primed = true;
    }
}
