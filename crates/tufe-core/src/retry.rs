//! Bounded retry with exponential backoff and jitter for transient transport
//! failures. Parse and shape failures are never retried here: the retry loop
//! only sees transport results.

use std::time::Duration;

use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Backoff strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed {
        delay: Duration,
    },
    /// `base * factor^attempt`, capped at `max`, optionally jittered by ±50%.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(250),
            factor: 2.0,
            max: Duration::from_secs(2),
            jitter: true,
        }
    }
}

impl Backoff {
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let scale = factor.powi(attempt.min(i32::MAX as u32) as i32);
                let seconds = (base.as_secs_f64() * scale).min(max.as_secs_f64());
                let delay = Duration::from_secs_f64(seconds.max(0.0));
                if !jitter {
                    return delay;
                }

                let jitter_ms = (delay.as_millis() as f64 * 0.5) as u64;
                let offset = fastrand::u64(0..=jitter_ms * 2);
                let total_ms = delay.as_millis() as i64 + offset as i64 - jitter_ms as i64;
                Duration::from_millis(total_ms.max(0) as u64)
            }
        }
    }
}

/// Retry policy for upstream calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
    pub retry_on_status: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: Backoff::default(),
            retry_on_status: vec![408, 429, 500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    pub fn exponential(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
            ..Self::default()
        }
    }

    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status)
    }
}

/// Executes `request`, retrying transient failures per `config`.
///
/// A non-retryable status is returned as a response, not an error; the caller
/// decides what a 404 means.
pub async fn execute_with_retry(
    client: &dyn HttpClient,
    request: HttpRequest,
    config: &RetryConfig,
) -> Result<HttpResponse, HttpError> {
    let mut attempt = 0;
    loop {
        let outcome = client.execute(request.clone()).await;
        let transient = match &outcome {
            Ok(response) => config.should_retry_status(response.status),
            Err(error) => error.retryable(),
        };

        if !transient || attempt >= config.max_retries {
            return outcome;
        }

        let delay = config.backoff.delay(attempt);
        tracing::debug!(
            url = %request.url,
            attempt = attempt + 1,
            delay_ms = delay.as_millis() as u64,
            "retrying transient upstream failure"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
