//! API client facade
//!
//! [`Client`] owns the configured transport stack and authentication
//! keys, and hands out per-resource services. Construction goes through
//! [`ClientBuilder`]; the built client is cheap to share behind an
//! `Arc` or by reference.
//!
//! Request dispatch composes three transport layers, innermost first:
//! plain HTTP, retry with backoff, then client-side rate limiting. The
//! rate limiter sits outermost so each logical request consumes exactly
//! one permit no matter how many retry attempts it takes.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::api::{
    AssessmentsService, AssetsService, FindingsService, MetaService, OrganizationsService,
    ReportsService, WebhooksService,
};
use crate::error::{Error, Result};
use crate::http::{
    GovernorLimiter, HttpTransport, RateLimitTransport, RateLimiter, RateLimiterConfig,
    RetryPolicy, RetryTransport, Transport,
};

/// Default base URL of the Redvault console API.
pub const DEFAULT_BASE_URL: &str = "https://console.redvault.io";

/// API version sent with every request.
pub const API_VERSION: &str = "2026-02-01";

/// Header carrying the pinned API version.
pub const HEADER_API_VERSION: &str = "X-Redvault-Api-Version";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Which credential a request authenticates with.
///
/// Organization keys cover the resources of a single organization;
/// integration keys manage organizations themselves. Meta endpoints
/// accept either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthKey {
    Organization,
    Integration,
    Either,
}

/// Builder for [`Client`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    base_url: String,
    organization_key: Option<String>,
    integration_key: Option<String>,
    retry: RetryPolicy,
    rate_limit: Option<RateLimiterConfig>,
    rate_limiter: Option<Arc<dyn RateLimiter>>,
    timeout: Duration,
    user_agent: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            organization_key: None,
            integration_key: None,
            retry: RetryPolicy::default(),
            rate_limit: Some(RateLimiterConfig::default()),
            rate_limiter: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("redvault/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientBuilder {
    /// Override the API base URL (defaults to [`DEFAULT_BASE_URL`]).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the organization API key.
    #[must_use]
    pub fn organization_key(mut self, key: impl Into<String>) -> Self {
        self.organization_key = Some(key.into());
        self
    }

    /// Set the integration API key.
    #[must_use]
    pub fn integration_key(mut self, key: impl Into<String>) -> Self {
        self.integration_key = Some(key.into());
        self
    }

    /// Set the retry policy for all requests.
    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Configure the built-in token-bucket rate limiter.
    #[must_use]
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.rate_limit = Some(config);
        self
    }

    /// Disable client-side rate limiting.
    #[must_use]
    pub fn no_rate_limit(mut self) -> Self {
        self.rate_limit = None;
        self.rate_limiter = None;
        self
    }

    /// Inject a custom rate limiter, replacing the built-in one.
    #[must_use]
    pub fn rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Set the per-request timeout (default 30s).
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the User-Agent header.
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Build the client, validating the base URL and assembling the
    /// transport stack.
    pub fn build(self) -> Result<Client> {
        let base_url = Url::parse(&self.base_url)?;

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        let transport: Arc<dyn Transport> = {
            let base = HttpTransport::new(http.clone());
            let with_retry = RetryTransport::new(base, self.retry);

            let limiter = self.rate_limiter.or_else(|| {
                self.rate_limit
                    .map(|config| Arc::new(GovernorLimiter::new(&config)) as Arc<dyn RateLimiter>)
            });

            match limiter {
                Some(limiter) => Arc::new(RateLimitTransport::new(with_retry, limiter)),
                None => Arc::new(with_retry),
            }
        };

        Ok(Client {
            base_url,
            http,
            transport,
            organization_key: self.organization_key,
            integration_key: self.integration_key,
        })
    }
}

/// Typed client for the Redvault security-assessment API.
///
/// ```rust,no_run
/// # use redvault::Client;
/// # async fn run() -> redvault::Result<()> {
/// let client = Client::builder()
///     .organization_key(std::env::var("REDVAULT_ORG_KEY").unwrap())
///     .build()?;
///
/// let asset = client.assets().get("asset_01").await?;
/// println!("{}", asset.name);
/// # Ok(())
/// # }
/// ```
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    transport: Arc<dyn Transport>,
    organization_key: Option<String>,
    integration_key: Option<String>,
}

impl Client {
    /// Create a builder with default settings.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client authenticated with an organization key and
    /// otherwise default settings.
    pub fn new(organization_key: impl Into<String>) -> Result<Self> {
        Self::builder().organization_key(organization_key).build()
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ------------------------------------------------------------------------
    // Services
    // ------------------------------------------------------------------------

    /// Assessment operations.
    pub fn assessments(&self) -> AssessmentsService<'_> {
        AssessmentsService::new(self)
    }

    /// Asset operations.
    pub fn assets(&self) -> AssetsService<'_> {
        AssetsService::new(self)
    }

    /// Finding operations.
    pub fn findings(&self) -> FindingsService<'_> {
        FindingsService::new(self)
    }

    /// Organization and API-key operations.
    pub fn organizations(&self) -> OrganizationsService<'_> {
        OrganizationsService::new(self)
    }

    /// Report retrieval.
    pub fn reports(&self) -> ReportsService<'_> {
        ReportsService::new(self)
    }

    /// Webhook subscription operations.
    pub fn webhooks(&self) -> WebhooksService<'_> {
        WebhooksService::new(self)
    }

    /// Metadata endpoints (OpenAPI document, webhook signing keys).
    pub fn meta(&self) -> MetaService<'_> {
        MetaService::new(self)
    }

    // ------------------------------------------------------------------------
    // Request dispatch
    // ------------------------------------------------------------------------

    fn auth_token(&self, kind: AuthKey) -> Result<&str> {
        match kind {
            AuthKey::Organization => self
                .organization_key
                .as_deref()
                .ok_or(Error::MissingOrganizationKey),
            AuthKey::Integration => self
                .integration_key
                .as_deref()
                .ok_or(Error::MissingIntegrationKey),
            AuthKey::Either => self
                .organization_key
                .as_deref()
                .or(self.integration_key.as_deref())
                .ok_or(Error::MissingAnyKey),
        }
    }

    /// Issue a request and return the raw response, mapping non-2xx
    /// statuses into structured API errors.
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        auth: AuthKey,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let url = self.base_url.join(path)?;
        let token = self.auth_token(auth)?;

        let mut builder = self
            .http
            .request(method.clone(), url)
            .header(HEADER_API_VERSION, API_VERSION)
            .bearer_auth(token);

        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let request = builder.build()?;
        let response = self.transport.execute(request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(Error::from_response(status.as_u16(), &body));
        }

        debug!(%method, path, status = status.as_u16(), "request succeeded");
        Ok(response)
    }

    /// Request returning a JSON body.
    pub(crate) async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        auth: AuthKey,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<T> {
        let response = self.send(method, path, auth, query, body).await?;
        Ok(response.json().await?)
    }

    /// Request where the response body is ignored.
    pub(crate) async fn request_empty(
        &self,
        method: Method,
        path: &str,
        auth: AuthKey,
        body: Option<&serde_json::Value>,
    ) -> Result<()> {
        self.send(method, path, auth, &[], body).await?;
        Ok(())
    }

    /// GET returning raw bytes (report PDFs).
    pub(crate) async fn request_bytes(&self, path: &str, auth: AuthKey) -> Result<Vec<u8>> {
        let response = self.send(Method::GET, path, auth, &[], None).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Serialize a request payload for dispatch.
    pub(crate) fn to_body<T: Serialize>(payload: &T) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(payload)?)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("has_organization_key", &self.organization_key.is_some())
            .field("has_integration_key", &self.integration_key.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builder_defaults() {
        let client = Client::builder()
            .organization_key("rv_org_123")
            .build()
            .unwrap();

        assert_eq!(client.base_url().as_str(), "https://console.redvault.io/");
    }

    #[test]
    fn test_builder_rejects_invalid_base_url() {
        let err = Client::builder().base_url("not a url").build().unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_auth_token_resolution() {
        let client = Client::builder()
            .organization_key("org")
            .integration_key("int")
            .build()
            .unwrap();
        assert_eq!(client.auth_token(AuthKey::Organization).unwrap(), "org");
        assert_eq!(client.auth_token(AuthKey::Integration).unwrap(), "int");
        assert_eq!(client.auth_token(AuthKey::Either).unwrap(), "org");

        let client = Client::builder().integration_key("int").build().unwrap();
        assert!(matches!(
            client.auth_token(AuthKey::Organization),
            Err(Error::MissingOrganizationKey)
        ));
        assert_eq!(client.auth_token(AuthKey::Either).unwrap(), "int");

        let client = Client::builder().build().unwrap();
        assert!(matches!(
            client.auth_token(AuthKey::Either),
            Err(Error::MissingAnyKey)
        ));
        assert!(matches!(
            client.auth_token(AuthKey::Integration),
            Err(Error::MissingIntegrationKey)
        ));
    }

    #[test]
    fn test_debug_hides_keys() {
        let client = Client::builder()
            .organization_key("rv_org_secret")
            .build()
            .unwrap();
        let out = format!("{client:?}");
        assert!(!out.contains("rv_org_secret"));
        assert!(out.contains("has_organization_key: true"));
    }
}
