//! Webhook signature verification
//!
//! Redvault signs webhook deliveries with a detached Ed25519 signature
//! over `timestamp || body` (no separator), carried in two headers. The
//! verifier tries every currently published public key so that key
//! rotation with overlapping key sets just works.

use std::time::Duration;

use base64::prelude::{Engine as _, BASE64_STANDARD};
use bytes::{Bytes, BytesMut};
use ed25519_dalek::pkcs8::DecodePublicKey;
use ed25519_dalek::{Signature, VerifyingKey, SIGNATURE_LENGTH};
use futures::StreamExt;
use http::HeaderMap;
use thiserror::Error;
use tracing::debug;

use crate::api::meta::WebhookSigningKey;

/// Header carrying the decimal Unix timestamp (seconds) of the delivery.
pub const HEADER_SIGNATURE_TIMESTAMP: &str = "X-Signature-Timestamp";
/// Header carrying the hex-encoded 64-byte Ed25519 signature.
pub const HEADER_SIGNATURE_ED25519: &str = "X-Signature-Ed25519";

const DEFAULT_MAX_CLOCK_SKEW: Duration = Duration::from_secs(5 * 60);
const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024; // 5 MiB

/// A webhook rejection reason.
///
/// Every variant maps to a stable machine-readable code (see [`code`]),
/// so operators can tell clock skew from tampering from malformed
/// requests in logs. All variants are locally terminal; none is retried.
///
/// [`code`]: WebhookError::code
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WebhookError {
    #[error("at least one signing key is required")]
    NoKeys,

    #[error("invalid signing key: {message}")]
    InvalidKey { message: String },

    #[error("missing X-Signature-Timestamp header")]
    MissingTimestamp,

    #[error("missing X-Signature-Ed25519 header")]
    MissingSignature,

    #[error("invalid timestamp format")]
    InvalidTimestamp,

    #[error("timestamp outside valid range")]
    TimestampExpired,

    #[error("invalid signature encoding")]
    InvalidSignature,

    #[error("failed to read request body")]
    ReadBody,

    #[error("request body exceeds maximum allowed size")]
    BodyTooLarge,

    #[error("signature verification failed")]
    SignatureInvalid,
}

impl WebhookError {
    /// Stable machine-readable code for this rejection reason.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoKeys => "ERR_NO_KEYS",
            Self::InvalidKey { .. } => "ERR_INVALID_KEY",
            Self::MissingTimestamp => "ERR_MISSING_TIMESTAMP",
            Self::MissingSignature => "ERR_MISSING_SIGNATURE",
            Self::InvalidTimestamp => "ERR_INVALID_TIMESTAMP",
            Self::TimestampExpired => "ERR_TIMESTAMP_EXPIRED",
            Self::InvalidSignature => "ERR_INVALID_SIGNATURE",
            Self::ReadBody => "ERR_READ_BODY",
            Self::BodyTooLarge => "ERR_BODY_TOO_LARGE",
            Self::SignatureInvalid => "ERR_SIGNATURE_INVALID",
        }
    }
}

/// Builder for [`WebhookVerifier`].
#[derive(Debug, Clone)]
pub struct WebhookVerifierBuilder {
    max_clock_skew: Duration,
    max_body_bytes: usize,
}

impl Default for WebhookVerifierBuilder {
    fn default() -> Self {
        Self {
            max_clock_skew: DEFAULT_MAX_CLOCK_SKEW,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl WebhookVerifierBuilder {
    /// Maximum allowed clock skew for timestamp validation (default 5 min).
    /// Timestamps too far in the past or the future are both rejected.
    #[must_use]
    pub fn max_clock_skew(mut self, skew: Duration) -> Self {
        self.max_clock_skew = skew;
        self
    }

    /// Maximum allowed request body size in bytes (default 5 MiB).
    #[must_use]
    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    /// Build a verifier from the signing keys published by the API.
    ///
    /// Fails fast: zero keys or any undecodable key aborts construction.
    pub fn build(self, keys: &[WebhookSigningKey]) -> Result<WebhookVerifier, WebhookError> {
        if keys.is_empty() {
            return Err(WebhookError::NoKeys);
        }

        let mut public_keys = Vec::with_capacity(keys.len());
        for key in keys {
            public_keys.push(parse_public_key(&key.public_key)?);
        }

        Ok(WebhookVerifier {
            public_keys,
            max_clock_skew: self.max_clock_skew,
            max_body_bytes: self.max_body_bytes,
        })
    }
}

/// Verifies webhook signatures from Redvault.
///
/// Built once from the key set returned by
/// [`MetaService::get_webhook_signing_keys`]; read-only afterwards, so a
/// shared reference can serve concurrent requests.
///
/// ```rust,ignore
/// let keys = client.meta().get_webhook_signing_keys().await?;
/// let verifier = Arc::new(WebhookVerifier::new(&keys)?);
/// let app = Router::new()
///     .route("/webhook", post(handle_event))
///     .layer(middleware::from_fn_with_state(verifier, webhook::verify_middleware));
/// ```
///
/// [`MetaService::get_webhook_signing_keys`]: crate::api::meta::MetaService::get_webhook_signing_keys
#[derive(Debug, Clone)]
pub struct WebhookVerifier {
    public_keys: Vec<VerifyingKey>,
    max_clock_skew: Duration,
    max_body_bytes: usize,
}

/// Decode a Base64-encoded SPKI (DER) Ed25519 public key.
fn parse_public_key(b64: &str) -> Result<VerifyingKey, WebhookError> {
    let der = BASE64_STANDARD
        .decode(b64)
        .map_err(|e| WebhookError::InvalidKey {
            message: format!("failed to decode base64 public key: {e}"),
        })?;

    VerifyingKey::from_public_key_der(&der).map_err(|e| WebhookError::InvalidKey {
        message: format!("failed to parse SPKI public key: {e}"),
    })
}

impl WebhookVerifier {
    /// Create a verifier with default options.
    pub fn new(keys: &[WebhookSigningKey]) -> Result<Self, WebhookError> {
        Self::builder().build(keys)
    }

    /// Create a builder to customize clock skew and body-size limits.
    pub fn builder() -> WebhookVerifierBuilder {
        WebhookVerifierBuilder::default()
    }

    /// Maximum body size accepted by this verifier.
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Check the signature and timestamp of an already-buffered request.
    ///
    /// Pure validation over headers and body bytes; use
    /// [`verify_request`](Self::verify_request) when the body is still a
    /// stream.
    pub fn verify(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), WebhookError> {
        let (timestamp, sig) = self.check_headers(headers)?;

        if body.len() > self.max_body_bytes {
            return Err(WebhookError::BodyTooLarge);
        }

        self.verify_signature(&timestamp, &sig, body)
    }

    /// Validate the signature headers: presence, timestamp format and
    /// skew, signature encoding. The body is not touched.
    fn check_headers(&self, headers: &HeaderMap) -> Result<(String, Signature), WebhookError> {
        let timestamp = headers
            .get(HEADER_SIGNATURE_TIMESTAMP)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or(WebhookError::MissingTimestamp)?;

        let signature = headers
            .get(HEADER_SIGNATURE_ED25519)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or(WebhookError::MissingSignature)?;

        let ts: i64 = timestamp
            .parse()
            .map_err(|_| WebhookError::InvalidTimestamp)?;

        let now = chrono::Utc::now().timestamp();
        if (now - ts).unsigned_abs() > self.max_clock_skew.as_secs() {
            return Err(WebhookError::TimestampExpired);
        }

        let sig = hex::decode(signature).map_err(|_| WebhookError::InvalidSignature)?;
        let sig: [u8; SIGNATURE_LENGTH] = sig
            .try_into()
            .map_err(|_| WebhookError::InvalidSignature)?;

        Ok((timestamp.to_string(), Signature::from_bytes(&sig)))
    }

    fn verify_signature(
        &self,
        timestamp: &str,
        sig: &Signature,
        body: &[u8],
    ) -> Result<(), WebhookError> {
        // Signed payload: raw timestamp header bytes then raw body, no
        // separator.
        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        for key in &self.public_keys {
            if key.verify_strict(&message, sig).is_ok() {
                return Ok(());
            }
        }

        debug!("webhook signature did not match any configured key");
        Err(WebhookError::SignatureInvalid)
    }

    /// Verify an axum/http request, buffering and restoring its body.
    ///
    /// The returned request carries the exact bytes that were read, so
    /// downstream handlers see the body unchanged whatever the outcome.
    pub async fn verify_request(
        &self,
        req: http::Request<axum::body::Body>,
    ) -> (http::Request<axum::body::Body>, Result<(), WebhookError>) {
        let (parts, body) = req.into_parts();

        // Headers are validated before the body is read; a request with
        // bad or missing signature headers is rejected for that reason
        // whatever its body looks like.
        let checked = self.check_headers(&parts.headers);
        let (bytes, read_err) = buffer_body(body, self.max_body_bytes).await;

        let result = match (checked, read_err) {
            (Err(err), _) => Err(err),
            (Ok(_), Some(err)) => Err(err),
            (Ok((timestamp, sig)), None) => self.verify_signature(&timestamp, &sig, &bytes),
        };

        let req = http::Request::from_parts(parts, axum::body::Body::from(bytes));
        (req, result)
    }
}

/// Read a body stream up to `max` bytes, detecting overflow without
/// draining an oversized stream.
async fn buffer_body(
    body: axum::body::Body,
    max: usize,
) -> (Bytes, Option<WebhookError>) {
    let mut stream = body.into_data_stream();
    let mut buf = BytesMut::new();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(_) => return (buf.freeze(), Some(WebhookError::ReadBody)),
        };
        buf.extend_from_slice(&chunk);
        if buf.len() > max {
            return (buf.freeze(), Some(WebhookError::BodyTooLarge));
        }
    }

    (buf.freeze(), None)
}
