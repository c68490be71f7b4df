//! Webhook signature verification and server-side middleware
//!
//! Redvault webhook deliveries carry an Ed25519 signature over the
//! delivery timestamp concatenated with the raw body. This module
//! verifies those signatures against the key set published at
//! `/api/v1/meta/webhooks/signing-keys`, either directly via
//! [`WebhookVerifier::verify`] or as an axum middleware layer via
//! [`verify_middleware`].

mod middleware;
mod verifier;

pub use middleware::verify_middleware;
pub use verifier::{
    WebhookError, WebhookVerifier, WebhookVerifierBuilder, HEADER_SIGNATURE_ED25519,
    HEADER_SIGNATURE_TIMESTAMP,
};
