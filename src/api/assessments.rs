//! Assessment operations
//!
//! An assessment is one autonomous penetration-test run against an
//! asset. Assessments are created under an asset, progress through the
//! states in [`AssessmentState`], and can be cancelled, paused, and
//! resumed while active.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{list_query, require_id, ListResponse};
use crate::client::{AuthKey, Client};
use crate::error::Result;
use crate::pagination::{ListOptions, Page, PageIter};

/// Lifecycle state of an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssessmentState {
    WaitingForCapacity,
    Running,
    Succeeded,
    ReportReady,
    Failed,
    Cancelling,
    Cancelled,
    Paused,
    WaitingForTimeWindow,
    /// A state this client version does not know about.
    #[serde(other)]
    Unknown,
}

impl AssessmentState {
    /// The wire representation of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WaitingForCapacity => "waiting-for-capacity",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::ReportReady => "report-ready",
            Self::Failed => "failed",
            Self::Cancelling => "cancelling",
            Self::Cancelled => "cancelled",
            Self::Paused => "paused",
            Self::WaitingForTimeWindow => "waiting-for-time-window",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for AssessmentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A security assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub name: String,
    pub asset_id: String,
    pub organization_id: String,
    pub state: AssessmentState,
    /// Completion fraction in `[0, 1]`.
    pub progress: f64,
    pub attack_credits: i64,
    #[serde(default)]
    pub recent_events: Vec<AssessmentEvent>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An event in an assessment's recent history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentEvent {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Summary row returned by assessment list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentListItem {
    pub id: String,
    pub name: String,
    pub state: AssessmentState,
    pub progress: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating an assessment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssessmentRequest {
    /// Attack-credit budget for the run.
    pub attack_credits: i64,
    /// Optional free-form objective to steer the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
}

/// Assessment operations, obtained from [`Client::assessments`].
pub struct AssessmentsService<'a> {
    client: &'a Client,
}

impl<'a> AssessmentsService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Retrieve an assessment by ID.
    pub async fn get(&self, id: &str) -> Result<Assessment> {
        require_id(id, "assessment id")?;
        self.client
            .request_json(
                Method::GET,
                &format!("/api/v1/assessments/{id}"),
                AuthKey::Organization,
                &[],
                None,
            )
            .await
    }

    /// Start a new assessment against an asset.
    pub async fn create(
        &self,
        asset_id: &str,
        req: &CreateAssessmentRequest,
    ) -> Result<Assessment> {
        require_id(asset_id, "asset id")?;
        let body = Client::to_body(req)?;
        self.client
            .request_json(
                Method::POST,
                &format!("/api/v1/assets/{asset_id}/assessments"),
                AuthKey::Organization,
                &[],
                Some(&body),
            )
            .await
    }

    /// Fetch one page of assessments for an asset.
    pub async fn list_by_asset(
        &self,
        asset_id: &str,
        opts: Option<ListOptions>,
    ) -> Result<Page<AssessmentListItem>> {
        require_id(asset_id, "asset id")?;
        let query = list_query(&opts.unwrap_or_default());
        let resp: ListResponse<AssessmentListItem> = self
            .client
            .request_json(
                Method::GET,
                &format!("/api/v1/assets/{asset_id}/assessments"),
                AuthKey::Organization,
                &query,
                None,
            )
            .await?;
        Ok(resp.into_page())
    }

    /// Iterate over all assessments for an asset.
    pub fn all_by_asset(
        &self,
        asset_id: &str,
        opts: Option<ListOptions>,
    ) -> PageIter<'a, AssessmentListItem> {
        let client = self.client;
        let asset_id = asset_id.to_string();
        PageIter::new(
            opts,
            Box::new(move |page_opts| {
                let service = AssessmentsService::new(client);
                let asset_id = asset_id.clone();
                Box::pin(async move { service.list_by_asset(&asset_id, Some(page_opts)).await })
            }),
        )
    }

    /// Cancel a running assessment.
    pub async fn cancel(&self, id: &str) -> Result<Assessment> {
        self.transition(id, "cancel").await
    }

    /// Pause a running assessment.
    pub async fn pause(&self, id: &str) -> Result<Assessment> {
        self.transition(id, "pause").await
    }

    /// Resume a paused assessment.
    pub async fn resume(&self, id: &str) -> Result<Assessment> {
        self.transition(id, "resume").await
    }

    async fn transition(&self, id: &str, action: &str) -> Result<Assessment> {
        require_id(id, "assessment id")?;
        self.client
            .request_json(
                Method::POST,
                &format!("/api/v1/assessments/{id}/{action}"),
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
    fn test_assessment_deserializes_wire_format() {
        let json = r#"{
            "id": "asmt_01",
            "name": "Weekly run",
            "assetId": "asset_01",
            "organizationId": "org_01",
            "state": "waiting-for-capacity",
            "progress": 0.25,
            "attackCredits": 100,
            "recentEvents": [
                {"name": "started", "timestamp": "2026-02-01T10:00:00Z"},
                {"name": "paused", "timestamp": "2026-02-01T11:00:00Z", "reason": "time window"}
            ],
            "createdAt": "2026-02-01T09:00:00Z",
            "updatedAt": "2026-02-01T11:00:00Z"
        }"#;

        let assessment: Assessment = serde_json::from_str(json).unwrap();
        assert_eq!(assessment.state, AssessmentState::WaitingForCapacity);
        assert_eq!(assessment.attack_credits, 100);
        assert_eq!(assessment.recent_events.len(), 2);
        assert_eq!(
            assessment.recent_events[1].reason.as_deref(),
            Some("time window")
        );
    }

    #[test]
    fn test_unknown_state_does_not_fail_deserialization() {
        let state: AssessmentState = serde_json::from_str(r#""quantum-entangled""#).unwrap();
        assert_eq!(state, AssessmentState::Unknown);
    }

    #[test]
    fn test_create_request_omits_absent_objective() {
        let req = CreateAssessmentRequest {
            attack_credits: 50,
            objective: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"attackCredits":50}"#);
    }
}
