//! Error types for the Redvault client
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use serde::Deserialize;
use thiserror::Error;

use crate::webhook::WebhookError;

/// Machine-readable error code returned for validation failures.
pub const ERR_CODE_VALIDATION: &str = "FST_ERR_VALIDATION";
/// Machine-readable error code returned when a resource does not exist.
pub const ERR_CODE_NOT_FOUND: &str = "ERR_NOT_FOUND";
/// Machine-readable error code returned when attack credits are exhausted.
pub const ERR_CODE_QUOTA_EXHAUSTED: &str = "ERR_QUOTA_EXHAUSTED";

/// The main error type for the Redvault client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("organization key is required")]
    MissingOrganizationKey,

    #[error("integration key is required")]
    MissingIntegrationKey,

    #[error("organization key or integration key is required")]
    MissingAnyKey,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A non-2xx response from the API, with the structured error envelope
    /// when the server supplied one.
    #[error("{message} (status={status}, code={code})")]
    Api {
        status: u16,
        code: String,
        error_type: String,
        message: String,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The injected rate limiter refused to grant a permit.
    #[error("rate limiter aborted: {message}")]
    Throttled { message: String },

    // ============================================================================
    // Pagination Protocol Errors
    // ============================================================================
    #[error("server indicated more pages but returned no cursor")]
    MissingCursor,

    #[error("server returned same cursor, stopping to prevent infinite loop")]
    CursorNotAdvancing,

    // ============================================================================
    // Webhook Verification Errors
    // ============================================================================
    #[error(transparent)]
    Webhook(#[from] WebhookError),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// JSON error envelope returned by the API on failure responses.
#[derive(Debug, Deserialize, Default)]
struct ApiErrorEnvelope {
    #[serde(default)]
    code: String,
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid-request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a throttled error
    pub fn throttled(message: impl Into<String>) -> Self {
        Self::Throttled {
            message: message.into(),
        }
    }

    /// Build a structured API error from a raw response status and body.
    ///
    /// The body is parsed as a `{code, error, message}` envelope when
    /// possible; otherwise status-based defaults are filled in so that
    /// callers can always branch on `code`/`status`.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let envelope: ApiErrorEnvelope = serde_json::from_slice(body).unwrap_or_default();

        if !envelope.code.is_empty() {
            return Self::Api {
                status,
                code: envelope.code,
                error_type: envelope.error,
                message: envelope.message,
            };
        }

        let (error_type, code) = match status {
            400 => ("Bad Request", ERR_CODE_VALIDATION),
            401 => ("Unauthorized", ""),
            403 => ("Forbidden", ""),
            404 => ("Not Found", ERR_CODE_NOT_FOUND),
            429 => ("Too Many Requests", ""),
            s if s >= 500 => ("Internal Server Error", ""),
            _ => ("", ""),
        };

        Self::Api {
            status,
            code: code.to_string(),
            error_type: error_type.to_string(),
            message: String::from_utf8_lossy(body).into_owned(),
        }
    }

    /// The HTTP status code, for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The machine-readable error code, for API errors.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } if !code.is_empty() => Some(code),
            _ => None,
        }
    }

    /// True if this is a 404 Not Found API error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// True if this is a 429 Too Many Requests API error.
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// True if this is a 401 Unauthorized API error.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// Result type alias for the Redvault client
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_response_with_envelope() {
        let body = br#"{"code":"ERR_QUOTA_EXHAUSTED","error":"Payment Required","message":"no attack credits left"}"#;
        let err = Error::from_response(402, body);

        assert_eq!(err.status(), Some(402));
        assert_eq!(err.code(), Some(ERR_CODE_QUOTA_EXHAUSTED));
        assert_eq!(
            err.to_string(),
            "no attack credits left (status=402, code=ERR_QUOTA_EXHAUSTED)"
        );
    }

    #[test]
    fn test_from_response_status_fallbacks() {
        let err = Error::from_response(404, b"not found");
        assert!(err.is_not_found());
        assert_eq!(err.code(), Some(ERR_CODE_NOT_FOUND));

        let err = Error::from_response(400, b"bad");
        assert_eq!(err.code(), Some(ERR_CODE_VALIDATION));

        let err = Error::from_response(429, b"slow down");
        assert!(err.is_rate_limited());
        assert_eq!(err.code(), None);

        let err = Error::from_response(503, b"unavailable");
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn test_from_response_ignores_non_json_body() {
        let err = Error::from_response(500, b"<html>oops</html>");
        match err {
            Error::Api {
                status,
                error_type,
                message,
                ..
            } => {
                assert_eq!(status, 500);
                assert_eq!(error_type, "Internal Server Error");
                assert_eq!(message, "<html>oops</html>");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = Error::config("missing base url");
        assert_eq!(err.to_string(), "Configuration error: missing base url");

        let err = Error::invalid_request("webhook id is required");
        assert_eq!(err.to_string(), "Invalid request: webhook id is required");
    }

    #[test]
    fn test_pagination_protocol_errors_are_distinct() {
        assert_ne!(
            Error::MissingCursor.to_string(),
            Error::CursorNotAdvancing.to_string()
        );
    }
}
