//! Tests for the transport stack

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use reqwest::{Method, Request, Response, Url};
use test_case::test_case;

use super::*;
use crate::error::{Error, Result};

/// One scripted outcome per attempt: a status code or a transport error.
enum Outcome {
    Status(u16),
    Error(String),
}

struct ScriptedTransport {
    calls: AtomicU32,
    script: Mutex<VecDeque<Outcome>>,
}

impl ScriptedTransport {
    fn new(outcomes: Vec<Outcome>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            script: Mutex::new(outcomes.into()),
        })
    }

    /// A transport that answers every attempt with the same status.
    fn always(status: u16) -> Arc<Self> {
        Self::new(vec![Outcome::Status(status)])
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for Arc<ScriptedTransport> {
    async fn execute(&self, _req: Request) -> Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = {
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                // Keep replaying the final entry.
                match script.front() {
                    Some(Outcome::Status(s)) => Outcome::Status(*s),
                    Some(Outcome::Error(m)) => Outcome::Error(m.clone()),
                    None => Outcome::Status(200),
                }
            }
        };
        match outcome {
            Outcome::Status(status) => {
                let resp = http::Response::builder().status(status).body("").unwrap();
                Ok(Response::from(resp))
            }
            Outcome::Error(message) => Err(Error::Other(message)),
        }
    }
}

fn request(method: Method) -> Request {
    Request::new(method, Url::parse("https://console.redvault.io/api/v1/ping").unwrap())
}

fn fast_policy() -> RetryPolicy {
    RetryPolicy::default().backoff(Duration::from_millis(1), Duration::from_millis(5))
}

// ============================================================================
// Retry transport
// ============================================================================

#[tokio::test]
async fn test_no_retry_on_success() {
    let base = ScriptedTransport::always(200);
    let rt = RetryTransport::new(base.clone(), fast_policy());

    let resp = rt.execute(request(Method::GET)).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(base.calls(), 1);
}

#[test_case(429)]
#[test_case(500)]
#[test_case(502)]
#[test_case(503)]
#[test_case(504)]
#[tokio::test]
async fn test_exhaustion_returns_last_response(status: u16) {
    let base = ScriptedTransport::always(status);
    let rt = RetryTransport::new(base.clone(), fast_policy().max_attempts(3));

    let resp = rt.execute(request(Method::GET)).await.unwrap();

    // Exhaustion is not an error: the final response comes back as-is.
    assert_eq!(resp.status().as_u16(), status);
    assert_eq!(base.calls(), 3);
}

#[tokio::test]
async fn test_eventual_success_stops_retrying() {
    let base = ScriptedTransport::new(vec![
        Outcome::Status(503),
        Outcome::Status(503),
        Outcome::Status(200),
    ]);
    let rt = RetryTransport::new(base.clone(), fast_policy().max_attempts(4));

    let resp = rt.execute(request(Method::GET)).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(base.calls(), 3);
}

#[tokio::test]
async fn test_non_retryable_status_returns_immediately() {
    let base = ScriptedTransport::always(404);
    let rt = RetryTransport::new(base.clone(), fast_policy());

    let resp = rt.execute(request(Method::GET)).await.unwrap();
    assert_eq!(resp.status().as_u16(), 404);
    assert_eq!(base.calls(), 1);
}

#[tokio::test]
async fn test_transport_error_not_retried() {
    let base = ScriptedTransport::new(vec![Outcome::Error("connection refused".into())]);
    let rt = RetryTransport::new(base.clone(), fast_policy().max_attempts(5));

    let err = rt.execute(request(Method::GET)).await.unwrap_err();
    assert_eq!(err.to_string(), "connection refused");
    assert_eq!(base.calls(), 1);
}

#[tokio::test]
async fn test_post_not_retried_by_default() {
    let base = ScriptedTransport::always(503);
    let rt = RetryTransport::new(base.clone(), fast_policy());

    let resp = rt.execute(request(Method::POST)).await.unwrap();
    assert_eq!(resp.status().as_u16(), 503);
    assert_eq!(base.calls(), 1);
}

#[tokio::test]
async fn test_post_retried_when_enabled() {
    let base = ScriptedTransport::always(503);
    let rt = RetryTransport::new(base.clone(), fast_policy().retry_post(true));

    let resp = rt.execute(request(Method::POST)).await.unwrap();
    assert_eq!(resp.status().as_u16(), 503);
    assert_eq!(base.calls(), 3);
}

#[tokio::test]
async fn test_unknown_method_single_attempt() {
    let base = ScriptedTransport::always(503);
    let rt = RetryTransport::new(base.clone(), fast_policy());

    let resp = rt.execute(request(Method::PATCH)).await.unwrap();
    assert_eq!(resp.status().as_u16(), 503);
    assert_eq!(base.calls(), 1);
}

#[test_case(Method::GET, true)]
#[test_case(Method::HEAD, true)]
#[test_case(Method::PUT, true)]
#[test_case(Method::DELETE, true)]
#[test_case(Method::POST, false)]
#[test_case(Method::PATCH, false)]
fn test_retryable_methods(method: Method, expected: bool) {
    let policy = RetryPolicy::default();
    assert_eq!(policy.retries_method(&method), expected);
}

// ============================================================================
// Backoff
// ============================================================================

#[test_case(0, 100)]
#[test_case(1, 200)]
#[test_case(2, 400)]
#[test_case(3, 800)]
#[test_case(4, 1000)]
#[test_case(5, 1000)]
fn test_backoff_without_jitter(attempt: u32, expected_ms: u64) {
    let policy = RetryPolicy::default().backoff(Duration::from_millis(100), Duration::from_secs(1));
    assert_eq!(
        policy.backoff_delay(attempt),
        Duration::from_millis(expected_ms)
    );
}

#[test]
fn test_backoff_with_jitter_stays_within_ceiling() {
    let policy = RetryPolicy::default()
        .backoff(Duration::from_millis(100), Duration::from_secs(1))
        .jitter(true);

    for _ in 0..100 {
        let delay = policy.backoff_delay(0);
        assert!(delay <= Duration::from_millis(100), "delay {delay:?} over ceiling");
    }
}

#[test]
fn test_policy_defaults() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.initial_backoff, Duration::from_millis(500));
    assert_eq!(policy.max_backoff, Duration::from_secs(30));
    assert!(!policy.jitter);
    assert!(!policy.retry_post);
    assert_eq!(policy.retryable_status_codes, vec![429, 500, 502, 503, 504]);
}

// ============================================================================
// Rate-limit transport
// ============================================================================

struct CountingLimiter {
    waits: AtomicU32,
    fail: bool,
}

#[async_trait]
impl RateLimiter for CountingLimiter {
    async fn wait(&self) -> Result<()> {
        self.waits.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(Error::throttled("limiter shutting down"))
        } else {
            Ok(())
        }
    }
}

#[tokio::test]
async fn test_rate_limit_waits_before_request() {
    let base = ScriptedTransport::always(200);
    let limiter = Arc::new(CountingLimiter {
        waits: AtomicU32::new(0),
        fail: false,
    });
    let rt = RateLimitTransport::new(base.clone(), limiter.clone());

    rt.execute(request(Method::GET)).await.unwrap();
    assert_eq!(limiter.waits.load(Ordering::SeqCst), 1);
    assert_eq!(base.calls(), 1);
}

#[tokio::test]
async fn test_rate_limit_aborted_wait_skips_request() {
    let base = ScriptedTransport::always(200);
    let limiter = Arc::new(CountingLimiter {
        waits: AtomicU32::new(0),
        fail: true,
    });
    let rt = RateLimitTransport::new(base.clone(), limiter);

    let err = rt.execute(request(Method::GET)).await.unwrap_err();
    assert!(matches!(err, Error::Throttled { .. }));
    assert_eq!(base.calls(), 0);
}

#[tokio::test]
async fn test_governor_limiter_allows_burst() {
    let limiter = GovernorLimiter::new(&RateLimiterConfig::new(10, 5));
    for _ in 0..5 {
        assert!(limiter.try_acquire());
    }
}

#[tokio::test]
async fn test_governor_limiter_wait_with_timeout() {
    let limiter = GovernorLimiter::new(&RateLimiterConfig::new(100, 10));
    assert!(limiter.wait_with_timeout(Duration::from_millis(100)).await);
}
