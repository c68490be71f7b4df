//! Metadata endpoints
//!
//! These accept either key kind. `get_webhook_signing_keys` feeds
//! [`WebhookVerifier`](crate::webhook::WebhookVerifier).

use serde::{Deserialize, Serialize};

use crate::client::{AuthKey, Client};
use crate::error::Result;

/// A public key used to sign webhook deliveries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSigningKey {
    /// Base64-encoded Ed25519 public key in SPKI (DER) form.
    pub public_key: String,
}

/// Metadata operations, obtained from [`Client::meta`].
pub struct MetaService<'a> {
    client: &'a Client,
}

impl<'a> MetaService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Download the OpenAPI document for the pinned API version as raw
    /// JSON bytes. The schema is dynamic, so no typed representation is
    /// offered.
    pub async fn get_openapi_spec(&self) -> Result<Vec<u8>> {
        self.client
            .request_bytes("/api/v1/meta/openapi.json", AuthKey::Either)
            .await
    }

    /// Retrieve the active webhook signing keys. More than one key is
    /// returned while a rotation is in progress.
    pub async fn get_webhook_signing_keys(&self) -> Result<Vec<WebhookSigningKey>> {
        self.client
            .request_json(
                reqwest::Method::GET,
                "/api/v1/meta/webhooks/signing-keys",
                AuthKey::Either,
                &[],
                None,
            )
            .await
    }
}
