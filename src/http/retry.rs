//! Retry transport
//!
//! Re-issues idempotent requests on transient server failures with
//! exponential backoff. Only a successfully received response with a
//! retryable status code triggers a retry; transport-level errors are
//! returned to the caller immediately.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::{Method, Request, Response};
use tracing::{debug, warn};

use super::transport::Transport;
use crate::error::Result;

/// Configures automatic retry behavior for transient failures.
///
/// Defaults: 3 attempts, 500ms initial backoff doubling up to 30s,
/// retryable statuses {429, 500, 502, 503, 504}, POST not retried,
/// jitter disabled. Jitter is off by default so that retry timing is
/// reproducible; enable it when many clients share an upstream.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first (minimum 1).
    pub max_attempts: u32,
    /// Backoff before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound on any single backoff delay.
    pub max_backoff: Duration,
    /// Randomize each delay uniformly in `[0, delay]`.
    pub jitter: bool,
    /// Status codes that trigger a retry.
    pub retryable_status_codes: Vec<u16>,
    /// Also retry POST requests (off by default: POST is not idempotent).
    pub retry_post: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            jitter: false,
            retryable_status_codes: vec![429, 500, 502, 503, 504],
            retry_post: false,
        }
    }
}

impl RetryPolicy {
    /// Set the total attempt count (values below 1 are clamped to 1).
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the backoff bounds.
    #[must_use]
    pub fn backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// Enable or disable jitter.
    #[must_use]
    pub fn jitter(mut self, enabled: bool) -> Self {
        self.jitter = enabled;
        self
    }

    /// Replace the retryable status code set.
    #[must_use]
    pub fn retryable_status_codes(mut self, codes: Vec<u16>) -> Self {
        self.retryable_status_codes = codes;
        self
    }

    /// Also retry POST requests.
    #[must_use]
    pub fn retry_post(mut self, enabled: bool) -> Self {
        self.retry_post = enabled;
        self
    }

    /// Whether requests with this method may be retried at all.
    pub fn retries_method(&self, method: &Method) -> bool {
        match *method {
            Method::GET | Method::HEAD | Method::PUT | Method::DELETE => true,
            Method::POST => self.retry_post,
            _ => false,
        }
    }

    /// Whether a received status code triggers a retry.
    pub fn retries_status(&self, status: u16) -> bool {
        self.retryable_status_codes.contains(&status)
    }

    /// Backoff delay for a zero-based retry attempt.
    ///
    /// `min(initial * 2^attempt, max)` exactly when jitter is off; a
    /// uniform sample from `[0, delay]` when jitter is on.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        let delay = self
            .initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff);

        if self.jitter {
            let nanos = rand::thread_rng().gen_range(0..=delay.as_nanos() as u64);
            Duration::from_nanos(nanos)
        } else {
            delay
        }
    }
}

/// Transport decorator that retries transient failures.
pub struct RetryTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> RetryTransport<T> {
    /// Wrap an inner transport with the given policy.
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryTransport<T> {
    async fn execute(&self, req: Request) -> Result<Response> {
        if !self.policy.retries_method(req.method()) {
            return self.inner.execute(req).await;
        }

        let mut current = req;
        let mut attempt = 0u32;

        loop {
            // Clone before sending; a streaming body cannot be cloned, in
            // which case the request gets a single attempt.
            let retry_clone = if attempt + 1 < self.policy.max_attempts {
                current.try_clone()
            } else {
                None
            };

            let resp = self.inner.execute(current).await?;
            let status = resp.status().as_u16();

            if !self.policy.retries_status(status) {
                return Ok(resp);
            }

            let Some(next) = retry_clone else {
                debug!(status, attempts = attempt + 1, "retry budget exhausted");
                return Ok(resp);
            };

            // Discard the failed response before waiting, so the connection
            // can be reused and attempt N+1 never overlaps attempt N.
            drop(resp);

            let delay = self.policy.backoff_delay(attempt);
            warn!(
                status,
                attempt = attempt + 1,
                max_attempts = self.policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                "retrying request"
            );
            tokio::time::sleep(delay).await;

            current = next;
            attempt += 1;
        }
    }
}
