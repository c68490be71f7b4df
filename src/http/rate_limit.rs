//! Rate-limit transport
//!
//! Throttles outgoing requests through an injected [`RateLimiter`]
//! before they reach the network. The bundled implementation uses the
//! governor crate's token bucket; any limiter implementing the trait
//! can be plugged in instead.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use reqwest::{Request, Response};

use super::transport::Transport;
use crate::error::{Error, Result};

/// Blocks until a request is allowed to proceed.
///
/// `wait` returns an error only when the wait itself is aborted (for
/// example by a shutdown signal inside a custom limiter); dropping the
/// future cancels an in-progress wait.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn wait(&self) -> Result<()>;
}

impl std::fmt::Debug for dyn RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RateLimiter")
    }
}

/// Configuration for the bundled token-bucket limiter.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of requests per second.
    pub requests_per_second: u32,
    /// Burst size (max tokens in the bucket).
    pub burst_size: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst_size: 10,
        }
    }
}

impl RateLimiterConfig {
    /// Create a new rate limiter config.
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }
}

/// Token-bucket [`RateLimiter`] backed by governor.
#[derive(Clone)]
pub struct GovernorLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl GovernorLimiter {
    /// Create a limiter with the given config.
    pub fn new(config: &RateLimiterConfig) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN),
        )
        .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN));

        Self {
            limiter: Arc::new(Governor::direct(quota)),
        }
    }

    /// Check if a request can be made immediately.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Wait with a timeout; false if the deadline elapsed first.
    pub async fn wait_with_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.limiter.until_ready())
            .await
            .is_ok()
    }
}

#[async_trait]
impl RateLimiter for GovernorLimiter {
    async fn wait(&self) -> Result<()> {
        self.limiter.until_ready().await;
        Ok(())
    }
}

impl std::fmt::Debug for GovernorLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GovernorLimiter").finish()
    }
}

/// Transport decorator that waits for a limiter permit before every
/// request. It performs no retries of its own; a failed wait aborts the
/// request with [`Error::Throttled`].
pub struct RateLimitTransport<T> {
    inner: T,
    limiter: Arc<dyn RateLimiter>,
}

impl<T> RateLimitTransport<T> {
    /// Wrap an inner transport with the given limiter.
    pub fn new(inner: T, limiter: Arc<dyn RateLimiter>) -> Self {
        Self { inner, limiter }
    }
}

#[async_trait]
impl<T: Transport> Transport for RateLimitTransport<T> {
    async fn execute(&self, req: Request) -> Result<Response> {
        self.limiter.wait().await.map_err(|err| match err {
            throttled @ Error::Throttled { .. } => throttled,
            other => Error::throttled(other.to_string()),
        })?;
        self.inner.execute(req).await
    }
}
