//! HTTP transport stack
//!
//! Decorator-style transports over a single execute-request capability:
//!
//! - **Retry**: exponential backoff with optional jitter for transient
//!   server failures on idempotent methods
//! - **Rate limiting**: cooperative throttling via an injected limiter
//!   (token bucket bundled, using governor)
//!
//! The client composes these with rate limiting outermost, so a throttle
//! permit covers one logical request rather than each retry attempt.

mod rate_limit;
mod retry;
mod transport;

pub use rate_limit::{GovernorLimiter, RateLimitTransport, RateLimiter, RateLimiterConfig};
pub use retry::{RetryPolicy, RetryTransport};
pub use transport::{HttpTransport, Transport};

#[cfg(test)]
mod tests;
