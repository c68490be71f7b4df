//! Organization operations
//!
//! Organizations are tenants managed through an integration, so every
//! operation here authenticates with the integration key rather than an
//! organization key. `create_key` mints the organization keys that the
//! other services use.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{list_query, require_id, ListResponse};
use crate::client::{AuthKey, Client};
use crate::error::{Error, Result};
use crate::pagination::{ListOptions, Page, PageIter};

/// A tenant organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    /// Caller-assigned identifier in the integrating system.
    #[serde(default)]
    pub external_id: Option<String>,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Summary row returned by organization list endpoints. Same shape as
/// the full resource.
pub type OrganizationListItem = Organization;

/// A member invited into a new organization.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationMember {
    pub email: String,
    pub name: String,
}

/// Parameters for creating an organization. At least one member is
/// required.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationRequest {
    pub name: String,
    /// `None` is sent as JSON null.
    pub external_id: Option<String>,
    pub members: Vec<OrganizationMember>,
}

/// Parameters for updating an organization. Both fields are sent;
/// `external_id: None` clears the value.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationRequest {
    pub name: String,
    pub external_id: Option<String>,
}

/// Parameters for minting an organization API key.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeyRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_days: Option<u32>,
}

/// A newly minted organization API key. `key` is the secret and is only
/// returned at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationApiKey {
    pub id: String,
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Organization operations, obtained from [`Client::organizations`].
pub struct OrganizationsService<'a> {
    client: &'a Client,
}

impl<'a> OrganizationsService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Retrieve an organization by ID.
    pub async fn get(&self, id: &str) -> Result<Organization> {
        require_id(id, "organization id")?;
        self.client
            .request_json(
                Method::GET,
                &format!("/api/v1/organizations/{id}"),
                AuthKey::Integration,
                &[],
                None,
            )
            .await
    }

    /// Create an organization under an integration.
    pub async fn create(
        &self,
        integration_id: &str,
        req: &CreateOrganizationRequest,
    ) -> Result<Organization> {
        require_id(integration_id, "integration id")?;
        if req.members.is_empty() {
            return Err(Error::invalid_request("at least one member is required"));
        }
        let body = Client::to_body(req)?;
        self.client
            .request_json(
                Method::POST,
                &format!("/api/v1/integrations/{integration_id}/organizations"),
                AuthKey::Integration,
                &[],
                Some(&body),
            )
            .await
    }

    /// Replace an organization's name and external ID.
    pub async fn update(
        &self,
        id: &str,
        req: &UpdateOrganizationRequest,
    ) -> Result<Organization> {
        require_id(id, "organization id")?;
        let body = Client::to_body(req)?;
        self.client
            .request_json(
                Method::PUT,
                &format!("/api/v1/organizations/{id}"),
                AuthKey::Integration,
                &[],
                Some(&body),
            )
            .await
    }

    /// Fetch one page of organizations for an integration.
    pub async fn list_by_integration(
        &self,
        integration_id: &str,
        opts: Option<ListOptions>,
    ) -> Result<Page<OrganizationListItem>> {
        require_id(integration_id, "integration id")?;
        let query = list_query(&opts.unwrap_or_default());
        let resp: ListResponse<OrganizationListItem> = self
            .client
            .request_json(
                Method::GET,
                &format!("/api/v1/integrations/{integration_id}/organizations"),
                AuthKey::Integration,
                &query,
                None,
            )
            .await?;
        Ok(resp.into_page())
    }

    /// Iterate over all organizations for an integration.
    pub fn all_by_integration(
        &self,
        integration_id: &str,
        opts: Option<ListOptions>,
    ) -> PageIter<'a, OrganizationListItem> {
        let client = self.client;
        let integration_id = integration_id.to_string();
        PageIter::new(
            opts,
            Box::new(move |page_opts| {
                let service = OrganizationsService::new(client);
                let integration_id = integration_id.clone();
                Box::pin(async move {
                    service
                        .list_by_integration(&integration_id, Some(page_opts))
                        .await
                })
            }),
        )
    }

    /// Mint an API key for an organization.
    pub async fn create_key(
        &self,
        organization_id: &str,
        req: &CreateKeyRequest,
    ) -> Result<OrganizationApiKey> {
        require_id(organization_id, "organization id")?;
        let body = Client::to_body(req)?;
        self.client
            .request_json(
                Method::POST,
                &format!("/api/v1/organizations/{organization_id}/keys"),
                AuthKey::Integration,
                &[],
                Some(&body),
            )
            .await
    }

    /// Revoke an organization API key.
    pub async fn revoke_key(&self, key_id: &str) -> Result<()> {
        require_id(key_id, "key id")?;
        self.client
            .request_empty(
                Method::DELETE,
                &format!("/api/v1/keys/{key_id}"),
                AuthKey::Integration,
                None,
            )
            .await
    }
}
