//! Report retrieval
//!
//! Reports are immutable artifacts produced when an assessment reaches
//! the report-ready state. `get` downloads the PDF; `get_summary`
//! returns a markdown digest suitable for chat and ticket integrations.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{list_query, require_id, ListResponse};
use crate::client::{AuthKey, Client};
use crate::error::Result;
use crate::pagination::{ListOptions, Page, PageIter};

/// Summary row returned by the report list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportListItem {
    pub id: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

/// Markdown digest of a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub markdown: String,
}

/// Report operations, obtained from [`Client::reports`].
pub struct ReportsService<'a> {
    client: &'a Client,
}

impl<'a> ReportsService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Download a report as raw PDF bytes.
    pub async fn get(&self, id: &str) -> Result<Vec<u8>> {
        require_id(id, "report id")?;
        self.client
            .request_bytes(&format!("/api/v1/reports/{id}"), AuthKey::Organization)
            .await
    }

    /// Retrieve the markdown summary of a report.
    pub async fn get_summary(&self, id: &str) -> Result<ReportSummary> {
        require_id(id, "report id")?;
        self.client
            .request_json(
                Method::GET,
                &format!("/api/v1/reports/{id}/summary"),
                AuthKey::Organization,
                &[],
                None,
            )
            .await
    }

    /// Fetch one page of reports for an asset.
    pub async fn list_by_asset(
        &self,
        asset_id: &str,
        opts: Option<ListOptions>,
    ) -> Result<Page<ReportListItem>> {
        require_id(asset_id, "asset id")?;
        let query = list_query(&opts.unwrap_or_default());
        let resp: ListResponse<ReportListItem> = self
            .client
            .request_json(
                Method::GET,
                &format!("/api/v1/assets/{asset_id}/reports"),
                AuthKey::Organization,
                &query,
                None,
            )
            .await?;
        Ok(resp.into_page())
    }

    /// Iterate over all reports for an asset.
    pub fn all_by_asset(
        &self,
        asset_id: &str,
        opts: Option<ListOptions>,
    ) -> PageIter<'a, ReportListItem> {
        let client = self.client;
        let asset_id = asset_id.to_string();
        PageIter::new(
            opts,
            Box::new(move |page_opts| {
                let service = ReportsService::new(client);
                let asset_id = asset_id.clone();
                Box::pin(async move { service.list_by_asset(&asset_id, Some(page_opts)).await })
            }),
        )
    }
}
