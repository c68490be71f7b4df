//! Finding operations
//!
//! Findings are the vulnerabilities an assessment discovered. They are
//! read-only except for `verify_fix`, which starts a focused assessment
//! that re-tests a single finding.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::assessments::Assessment;
use super::{list_query, require_id, ListResponse};
use crate::client::{AuthKey, Client};
use crate::error::Result;
use crate::pagination::{ListOptions, Page, PageIter};

/// A vulnerability discovered by an assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub id: String,
    pub name: String,
    pub severity: String,
    pub state: String,
    pub summary: String,
    pub impact: String,
    pub mitigations: String,
    /// Reproduction steps.
    pub recipe: String,
    pub evidence: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Summary row returned by finding list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingListItem {
    pub id: String,
    pub name: String,
    pub severity: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Finding operations, obtained from [`Client::findings`].
pub struct FindingsService<'a> {
    client: &'a Client,
}

impl<'a> FindingsService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Retrieve a finding by ID.
    pub async fn get(&self, id: &str) -> Result<Finding> {
        require_id(id, "finding id")?;
        self.client
            .request_json(
                Method::GET,
                &format!("/api/v1/findings/{id}"),
                AuthKey::Organization,
                &[],
                None,
            )
            .await
    }

    /// Fetch one page of findings for an asset.
    pub async fn list_by_asset(
        &self,
        asset_id: &str,
        opts: Option<ListOptions>,
    ) -> Result<Page<FindingListItem>> {
        require_id(asset_id, "asset id")?;
        let query = list_query(&opts.unwrap_or_default());
        let resp: ListResponse<FindingListItem> = self
            .client
            .request_json(
                Method::GET,
                &format!("/api/v1/assets/{asset_id}/findings"),
                AuthKey::Organization,
                &query,
                None,
            )
            .await?;
        Ok(resp.into_page())
    }

    /// Iterate over all findings for an asset.
    pub fn all_by_asset(
        &self,
        asset_id: &str,
        opts: Option<ListOptions>,
    ) -> PageIter<'a, FindingListItem> {
        let client = self.client;
        let asset_id = asset_id.to_string();
        PageIter::new(
            opts,
            Box::new(move |page_opts| {
                let service = FindingsService::new(client);
                let asset_id = asset_id.clone();
                Box::pin(async move { service.list_by_asset(&asset_id, Some(page_opts)).await })
            }),
        )
    }

    /// Start an assessment that re-tests whether this finding is fixed.
    pub async fn verify_fix(&self, id: &str) -> Result<Assessment> {
        require_id(id, "finding id")?;
        self.client
            .request_json(
                Method::POST,
                &format!("/api/v1/findings/{id}/verify-fix"),
                AuthKey::Organization,
                &[],
                None,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_finding_deserializes_wire_format() {
        let json = r#"{
            "id": "find_01",
            "name": "SQL injection in search",
            "severity": "critical",
            "state": "open",
            "summary": "The q parameter is interpolated into SQL.",
            "impact": "Full database read.",
            "mitigations": "Use bound parameters.",
            "recipe": "GET /search?q='--",
            "evidence": "200 OK with table dump",
            "createdAt": "2026-02-01T10:00:00Z",
            "updatedAt": "2026-02-02T09:00:00Z"
        }"#;

        let finding: Finding = serde_json::from_str(json).unwrap();
        assert_eq!(finding.severity, "critical");
        assert_eq!(finding.state, "open");
        assert_eq!(finding.recipe, "GET /search?q='--");
    }
}
