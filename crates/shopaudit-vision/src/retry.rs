//! Exponential back-off for transient vision API failures.

use std::future::Future;
use std::time::Duration;

use crate::error::VisionError;

const MAX_DELAY_MS: u64 = 60_000;

/// Network failures, throttling and 5xx are worth another attempt. API error
/// envelopes on 4xx (bad key, unreadable image) and bad bodies are not.
pub(crate) fn is_retriable(err: &VisionError) -> bool {
    match err {
        VisionError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status().is_some_and(|s| is_retriable_status(s.as_u16()))
        }
        VisionError::UnexpectedStatus { status } => is_retriable_status(*status),
        VisionError::Api { .. }
        | VisionError::Deserialize { .. }
        | VisionError::InvalidBaseUrl { .. } => false,
    }
}

pub(crate) fn is_retriable_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Nominal wait before retry number `retry` (1-based): `base_ms * 2^(retry-1)`,
/// capped at one minute. Jitter is applied separately.
fn backoff_ms(base_ms: u64, retry: u32) -> u64 {
    let exponent = retry.saturating_sub(1).min(10);
    base_ms.saturating_mul(1 << exponent).min(MAX_DELAY_MS)
}

/// Scales `ms` by a random factor in `[0.75, 1.25]`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn with_jitter(ms: u64) -> Duration {
    let factor = rand::random_range(0.75_f64..=1.25);
    Duration::from_millis((ms as f64 * factor) as u64)
}

/// Runs `operation`, retrying transient failures up to `max_retries` times.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, VisionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, VisionError>>,
{
    let mut retries = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if retries >= max_retries || !is_retriable(&err) {
            return Err(err);
        }
        retries += 1;

        let delay = with_jitter(backoff_ms(backoff_base_ms, retries));
        tracing::warn!(
            retry = retries,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient vision API failure, backing off"
        );
        tokio::time::sleep(delay).await;
    }
}
