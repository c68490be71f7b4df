//! Asset operations
//!
//! An asset is a target under test: a start URL plus the guardrails the
//! platform must respect while attacking it (boundary rules, approved
//! time windows, request-rate cap, seeded credentials).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{list_query, require_id, ListResponse};
use crate::client::{AuthKey, Client};
use crate::error::Result;
use crate::pagination::{ListOptions, Page, PageIter};

/// A target under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub organization_id: String,
    pub lifecycle: String,
    pub sku: String,
    #[serde(default)]
    pub start_url: Option<String>,
    #[serde(default)]
    pub max_requests_per_second: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_time_windows: Option<ApprovedTimeWindows>,
    #[serde(default)]
    pub credentials: Vec<Credential>,
    #[serde(default)]
    pub dns_boundary_rules: Vec<BoundaryRule>,
    #[serde(default)]
    pub http_boundary_rules: Vec<BoundaryRule>,
    /// Extra headers sent with every attack request. Single-string and
    /// string-array values both appear on the wire.
    #[serde(default)]
    pub headers: HashMap<String, HeaderValues>,
    #[serde(default)]
    pub checks: Option<AssetChecks>,
    #[serde(default)]
    pub archive_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Header value that is either a single string or a list of strings on
/// the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum HeaderValues {
    One(String),
    Many(Vec<String>),
}

/// Weekly recurring windows during which attacks may run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedTimeWindows {
    /// IANA timezone name the entries are interpreted in.
    pub tz: String,
    pub entries: Vec<TimeWindowEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindowEntry {
    /// 0 = Sunday .. 6 = Saturday.
    pub start_weekday: u8,
    /// "HH:MM" local to `tz`.
    pub start_time: String,
    pub end_weekday: u8,
    pub end_time: String,
}

/// A credential seeded into the target for authenticated testing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_uri: Option<String>,
}

/// An allow/deny scoping rule. The same shape covers DNS and HTTP
/// boundaries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryRule {
    pub id: String,
    pub action: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub filter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_subdomains: Option<bool>,
}

/// Pre-flight check results for an asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetChecks {
    pub asset_reachable: AssetCheck,
    pub credentials: AssetCheck,
    pub dns_boundary_rules: AssetCheck,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetCheck {
    pub state: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

/// Summary row returned by asset list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetListItem {
    pub id: String,
    pub name: String,
    pub lifecycle: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating an asset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetRequest {
    pub name: String,
    pub sku: String,
}

/// Parameters for updating an asset. This is a full-document PUT: every
/// field is sent, and omitting a collection clears it server-side.
/// Deserializable so the full document can be loaded from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssetRequest {
    pub name: String,
    pub start_url: String,
    pub max_requests_per_second: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_time_windows: Option<ApprovedTimeWindows>,
    #[serde(default)]
    pub credentials: Vec<Credential>,
    #[serde(default)]
    pub dns_boundary_rules: Vec<BoundaryRule>,
    #[serde(default)]
    pub http_boundary_rules: Vec<BoundaryRule>,
    #[serde(default)]
    pub headers: HashMap<String, HeaderValues>,
}

/// Asset operations, obtained from [`Client::assets`].
pub struct AssetsService<'a> {
    client: &'a Client,
}

impl<'a> AssetsService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Retrieve an asset by ID.
    pub async fn get(&self, id: &str) -> Result<Asset> {
        require_id(id, "asset id")?;
        self.client
            .request_json(
                Method::GET,
                &format!("/api/v1/assets/{id}"),
                AuthKey::Organization,
                &[],
                None,
            )
            .await
    }

    /// Create an asset under an organization.
    pub async fn create(&self, organization_id: &str, req: &CreateAssetRequest) -> Result<Asset> {
        require_id(organization_id, "organization id")?;
        let body = Client::to_body(req)?;
        self.client
            .request_json(
                Method::POST,
                &format!("/api/v1/organizations/{organization_id}/assets"),
                AuthKey::Organization,
                &[],
                Some(&body),
            )
            .await
    }

    /// Replace an asset's configuration.
    pub async fn update(&self, id: &str, req: &UpdateAssetRequest) -> Result<Asset> {
        require_id(id, "asset id")?;
        let body = Client::to_body(req)?;
        self.client
            .request_json(
                Method::PUT,
                &format!("/api/v1/assets/{id}"),
                AuthKey::Organization,
                &[],
                Some(&body),
            )
            .await
    }

    /// Fetch one page of assets for an organization.
    pub async fn list_by_organization(
        &self,
        organization_id: &str,
        opts: Option<ListOptions>,
    ) -> Result<Page<AssetListItem>> {
        require_id(organization_id, "organization id")?;
        let query = list_query(&opts.unwrap_or_default());
        let resp: ListResponse<AssetListItem> = self
            .client
            .request_json(
                Method::GET,
                &format!("/api/v1/organizations/{organization_id}/assets"),
                AuthKey::Organization,
                &query,
                None,
            )
            .await?;
        Ok(resp.into_page())
    }

    /// Iterate over all assets for an organization.
    pub fn all_by_organization(
        &self,
        organization_id: &str,
        opts: Option<ListOptions>,
    ) -> PageIter<'a, AssetListItem> {
        let client = self.client;
        let organization_id = organization_id.to_string();
        PageIter::new(
            opts,
            Box::new(move |page_opts| {
                let service = AssetsService::new(client);
                let organization_id = organization_id.clone();
                Box::pin(async move {
                    service
                        .list_by_organization(&organization_id, Some(page_opts))
                        .await
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
    fn test_asset_deserializes_full_document() {
        let json = r#"{
            "id": "asset_01",
            "name": "Staging",
            "organizationId": "org_01",
            "lifecycle": "active",
            "sku": "web-app",
            "startUrl": "https://staging.example.com",
            "maxRequestsPerSecond": 20,
            "approvedTimeWindows": {
                "tz": "Europe/London",
                "entries": [
                    {"startWeekday": 1, "startTime": "09:00", "endWeekday": 5, "endTime": "17:00"}
                ]
            },
            "credentials": [
                {"id": "cred_1", "name": "admin", "type": "password",
                 "username": "admin", "password": "hunter2"}
            ],
            "dnsBoundaryRules": [
                {"id": "dns_1", "action": "allow", "type": "domain",
                 "filter": "example.com", "includeSubdomains": true}
            ],
            "httpBoundaryRules": [],
            "headers": {
                "X-Test": "1",
                "X-Multi": ["a", "b"]
            },
            "checks": {
                "assetReachable": {"state": "passed", "message": ""},
                "credentials": {"state": "failed", "message": "login failed",
                    "error": {"type": "auth", "status": 403}},
                "dnsBoundaryRules": {"state": "passed", "message": ""},
                "updatedAt": "2026-02-01T10:00:00Z"
            },
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-02-01T10:00:00Z"
        }"#;

        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.start_url.as_deref(), Some("https://staging.example.com"));
        assert_eq!(asset.max_requests_per_second, Some(20));
        assert_eq!(
            asset.approved_time_windows.as_ref().unwrap().tz,
            "Europe/London"
        );
        assert_eq!(asset.dns_boundary_rules[0].include_subdomains, Some(true));
        assert_eq!(
            asset.headers["X-Test"],
            HeaderValues::One("1".to_string())
        );
        assert_eq!(
            asset.headers["X-Multi"],
            HeaderValues::Many(vec!["a".to_string(), "b".to_string()])
        );
        let checks = asset.checks.unwrap();
        assert_eq!(checks.credentials.state, "failed");
        assert!(checks.credentials.error.is_some());
    }

    #[test]
    fn test_asset_tolerates_sparse_document() {
        let json = r#"{
            "id": "asset_02",
            "name": "Bare",
            "organizationId": "org_01",
            "lifecycle": "draft",
            "sku": "web-app",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        }"#;

        let asset: Asset = serde_json::from_str(json).unwrap();
        assert!(asset.start_url.is_none());
        assert!(asset.credentials.is_empty());
        assert!(asset.checks.is_none());
    }

    #[test]
    fn test_update_request_loads_from_json_document() {
        // The CLI reads the full update document from a file.
        let json = r#"{
            "name": "Staging",
            "startUrl": "https://staging.example.com",
            "maxRequestsPerSecond": 10,
            "credentials": [
                {"id": "cred_1", "name": "admin", "type": "password",
                 "username": "admin", "password": "hunter2"}
            ]
        }"#;

        let req: UpdateAssetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.name, "Staging");
        assert_eq!(req.credentials.len(), 1);
        assert!(req.sku.is_none());
        assert!(req.dns_boundary_rules.is_empty());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn test_update_request_serializes_full_document() {
        let req = UpdateAssetRequest {
            name: "Staging".to_string(),
            start_url: "https://staging.example.com".to_string(),
            max_requests_per_second: 10,
            ..UpdateAssetRequest::default()
        };

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["name"], "Staging");
        // Collections are present even when empty; this is a full PUT.
        assert!(value["credentials"].as_array().unwrap().is_empty());
        assert!(value.get("sku").is_none());
    }
}
