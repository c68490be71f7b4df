//! Transport abstraction
//!
//! A [`Transport`] executes one HTTP request and returns one response.
//! The retry and rate-limit decorators wrap an inner transport behind the
//! same trait, so they compose in either order.

use async_trait::async_trait;
use reqwest::{Request, Response};

use crate::error::Result;

/// Execute an HTTP request and return the response.
///
/// Transport-level failures (connection refused, TLS, timeouts) surface
/// as `Err`; any received response, whatever its status code, is `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, req: Request) -> Result<Response>;
}

/// The base transport: a thin wrapper over [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Wrap a configured reqwest client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, req: Request) -> Result<Response> {
        Ok(self.client.execute(req).await?)
    }
}
