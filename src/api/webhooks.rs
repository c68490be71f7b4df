//! Webhook subscription operations
//!
//! Webhook subscriptions deliver platform events to a target URL,
//! signed with the keys published by the meta endpoints (see
//! [`crate::webhook`] for verification). Deliveries are recorded and can
//! be listed for debugging.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{list_query, require_id, ListResponse};
use crate::client::{AuthKey, Client};
use crate::error::Result;
use crate::pagination::{ListOptions, Page, PageIter};

/// A webhook subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    /// API version the payloads are rendered with.
    pub api_version: String,
    pub target_url: String,
    pub events: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Summary row returned by webhook list endpoints. Same shape as the
/// full resource.
pub type WebhookListItem = Webhook;

/// Parameters for creating a webhook subscription.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebhookRequest {
    pub api_version: String,
    pub target_url: String,
    pub events: Vec<String>,
}

/// Parameters for updating a webhook subscription. Only provided fields
/// change.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWebhookRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
}

/// One recorded delivery attempt for a webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookDelivery {
    /// Event payload that was delivered.
    pub payload: String,
    pub request: WebhookDeliveryRequest,
    pub response: WebhookDeliveryResponse,
    pub sent_at: DateTime<Utc>,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookDeliveryRequest {
    pub body: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookDeliveryResponse {
    pub body: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    pub status: u16,
}

/// Webhook subscription operations, obtained from [`Client::webhooks`].
pub struct WebhooksService<'a> {
    client: &'a Client,
}

impl<'a> WebhooksService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Retrieve a webhook subscription by ID.
    pub async fn get(&self, id: &str) -> Result<Webhook> {
        require_id(id, "webhook id")?;
        self.client
            .request_json(
                Method::GET,
                &format!("/api/v1/webhooks/{id}"),
                AuthKey::Organization,
                &[],
                None,
            )
            .await
    }

    /// Create a webhook subscription under an organization.
    pub async fn create(
        &self,
        organization_id: &str,
        req: &CreateWebhookRequest,
    ) -> Result<Webhook> {
        require_id(organization_id, "organization id")?;
        let body = Client::to_body(req)?;
        self.client
            .request_json(
                Method::POST,
                &format!("/api/v1/organizations/{organization_id}/webhooks"),
                AuthKey::Organization,
                &[],
                Some(&body),
            )
            .await
    }

    /// Partially update a webhook subscription.
    pub async fn update(&self, id: &str, req: &UpdateWebhookRequest) -> Result<Webhook> {
        require_id(id, "webhook id")?;
        let body = Client::to_body(req)?;
        self.client
            .request_json(
                Method::PATCH,
                &format!("/api/v1/webhooks/{id}"),
                AuthKey::Organization,
                &[],
                Some(&body),
            )
            .await
    }

    /// Delete a webhook subscription.
    pub async fn delete(&self, id: &str) -> Result<()> {
        require_id(id, "webhook id")?;
        self.client
            .request_empty(
                Method::DELETE,
                &format!("/api/v1/webhooks/{id}"),
                AuthKey::Organization,
                None,
            )
            .await
    }

    /// Send a signed test delivery to the webhook's target URL.
    pub async fn ping(&self, id: &str) -> Result<()> {
        require_id(id, "webhook id")?;
        self.client
            .request_empty(
                Method::POST,
                &format!("/api/v1/webhooks/{id}/ping"),
                AuthKey::Organization,
                None,
            )
            .await
    }

    /// Fetch one page of webhook subscriptions for an organization.
    pub async fn list_by_organization(
        &self,
        organization_id: &str,
        opts: Option<ListOptions>,
    ) -> Result<Page<WebhookListItem>> {
        require_id(organization_id, "organization id")?;
        let query = list_query(&opts.unwrap_or_default());
        let resp: ListResponse<WebhookListItem> = self
            .client
            .request_json(
                Method::GET,
                &format!("/api/v1/organizations/{organization_id}/webhooks"),
                AuthKey::Organization,
                &query,
                None,
            )
            .await?;
        Ok(resp.into_page())
    }

    /// Iterate over all webhook subscriptions for an organization.
    pub fn all_by_organization(
        &self,
        organization_id: &str,
        opts: Option<ListOptions>,
    ) -> PageIter<'a, WebhookListItem> {
        let client = self.client;
        let organization_id = organization_id.to_string();
        PageIter::new(
            opts,
            Box::new(move |page_opts| {
                let service = WebhooksService::new(client);
                let organization_id = organization_id.clone();
                Box::pin(async move {
                    service
                        .list_by_organization(&organization_id, Some(page_opts))
                        .await
                })
            }),
        )
    }

    /// Fetch one page of recorded deliveries for a webhook.
    pub async fn list_deliveries(
        &self,
        webhook_id: &str,
        opts: Option<ListOptions>,
    ) -> Result<Page<WebhookDelivery>> {
        require_id(webhook_id, "webhook id")?;
        let query = list_query(&opts.unwrap_or_default());
        let resp: ListResponse<WebhookDelivery> = self
            .client
            .request_json(
                Method::GET,
                &format!("/api/v1/webhooks/{webhook_id}/deliveries"),
                AuthKey::Organization,
                &query,
                None,
            )
            .await?;
        Ok(resp.into_page())
    }

    /// Iterate over all recorded deliveries for a webhook.
    pub fn all_deliveries(
        &self,
        webhook_id: &str,
        opts: Option<ListOptions>,
    ) -> PageIter<'a, WebhookDelivery> {
        let client = self.client;
        let webhook_id = webhook_id.to_string();
        PageIter::new(
            opts,
            Box::new(move |page_opts| {
                let service = WebhooksService::new(client);
                let webhook_id = webhook_id.clone();
                Box::pin(async move {
                    service.list_deliveries(&webhook_id, Some(page_opts)).await
                })
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_update_request_omits_absent_fields() {
        let req = UpdateWebhookRequest {
            target_url: Some("https://hooks.example.com/rv".to_string()),
            ..UpdateWebhookRequest::default()
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"targetUrl":"https://hooks.example.com/rv"}"#);
    }

    #[test]
    fn test_delivery_deserializes_wire_format() {
        let json = r#"{
            "payload": "{\"event\":\"assessment.succeeded\"}",
            "request": {
                "body": "{\"event\":\"assessment.succeeded\"}",
                "headers": {"X-Signature-Ed25519": "ab"}
            },
            "response": {"body": "ok", "headers": {}, "status": 200},
            "sentAt": "2026-02-01T10:00:00Z",
            "success": true
        }"#;

        let delivery: WebhookDelivery = serde_json::from_str(json).unwrap();
        assert!(delivery.success);
        assert_eq!(delivery.response.status, 200);
        assert_eq!(
            delivery.request.headers["X-Signature-Ed25519"],
            "ab"
        );
    }
}
