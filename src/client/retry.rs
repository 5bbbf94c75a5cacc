//! Retry of transient HTTP responses.
//!
//! The service answers 429 and 503 under load. [`RetryPolicy::run`] repeats
//! the call with a linearly growing pause (`base_delay * retry`) until the
//! response is something else or the attempt ceiling is reached. The last
//! response is always handed back so the caller can judge its status.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use super::transport::HttpResponse;
use crate::error::ConvertError;

/// Statuses worth another attempt.
pub const RETRY_ON_STATUS_CODES: [u16; 2] = [429, 503];

/// Default ceiling on attempts for one request, initial call included.
pub const MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Attempts for a single request, the first one included.
    pub max_attempts: u32,
    /// Pause before the first retry; the n-th retry waits `n * base_delay`.
    #[serde(rename = "base_delay_ms", with = "millis")]
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay slept before retry number `retry` (starting at 1).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        self.base_delay * retry
    }

    pub fn is_retryable(status: u16) -> bool {
        RETRY_ON_STATUS_CODES.contains(&status)
    }

    /// Drive `call` until it yields a non-transient response or the attempts
    /// run out. Transport errors are not retried.
    pub async fn run<F, Fut>(&self, mut call: F) -> Result<HttpResponse, ConvertError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<HttpResponse, ConvertError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut retries = 0;

        loop {
            let response = call().await?;
            let attempt = retries + 1;

            if !Self::is_retryable(response.status) || attempt >= max_attempts {
                if Self::is_retryable(response.status) {
                    tracing::warn!(
                        status = response.status,
                        attempts = attempt,
                        "giving up after transient responses"
                    );
                }
                return Ok(response);
            }

            retries += 1;
            let delay = self.delay_for_retry(retries);
            tracing::debug!(
                status = response.status,
                retry = retries,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                "transient response, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
