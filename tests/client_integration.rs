//! Integration tests against a mock HTTP server
//!
//! Exercises the full stack: client builder, transport decorators,
//! pagination, and error mapping.

use std::time::Duration;

use redvault::http::RetryPolicy;
use redvault::{Client, Error, ListOptions};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Client {
    Client::builder()
        .base_url(server.uri())
        .organization_key("rv_org_test")
        .integration_key("rv_int_test")
        .retry_policy(
            RetryPolicy::default().backoff(Duration::from_millis(1), Duration::from_millis(5)),
        )
        .no_rate_limit()
        .build()
        .unwrap()
}

#[tokio::test]
async fn sends_auth_and_version_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/findings/find_01"))
        .and(header("Authorization", "Bearer rv_org_test"))
        .and(header("X-Redvault-Api-Version", "2026-02-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "find_01",
            "name": "XSS in profile page",
            "severity": "high",
            "state": "open",
            "summary": "Stored XSS",
            "impact": "Account takeover",
            "mitigations": "Escape output",
            "recipe": "POST /profile",
            "evidence": "alert(1)",
            "createdAt": "2026-02-01T10:00:00Z",
            "updatedAt": "2026-02-01T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let finding = client.findings().get("find_01").await.unwrap();
    assert_eq!(finding.severity, "high");
}

#[tokio::test]
async fn organization_endpoints_use_integration_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/organizations/org_01"))
        .and(header("Authorization", "Bearer rv_int_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "org_01",
            "name": "Acme",
            "state": "active",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let org = client.organizations().get("org_01").await.unwrap();
    assert_eq!(org.name, "Acme");
    assert!(org.external_id.is_none());
}

#[tokio::test]
async fn missing_key_fails_before_any_request() {
    let server = MockServer::start().await;
    // No mocks mounted: a request would 404 loudly.

    let client = Client::builder()
        .base_url(server.uri())
        .integration_key("rv_int_test")
        .build()
        .unwrap();

    let err = client.findings().get("find_01").await.unwrap_err();
    assert!(matches!(err, Error::MissingOrganizationKey));
}

#[tokio::test]
async fn paginates_across_multiple_pages() {
    let server = MockServer::start().await;

    let item = |id: &str| {
        json!({
            "id": id,
            "name": id,
            "state": "succeeded",
            "progress": 1.0,
            "createdAt": "2026-02-01T10:00:00Z",
            "updatedAt": "2026-02-01T10:00:00Z"
        })
    };

    // First page: no cursor sent.
    Mock::given(method("GET"))
        .and(path("/api/v1/assets/asset_01/assessments"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [item("a1"), item("a2")],
            "nextCursor": "cur_2"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // Second page, requested with the cursor from the first.
    Mock::given(method("GET"))
        .and(path("/api/v1/assets/asset_01/assessments"))
        .and(query_param("after", "cur_2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [item("a3")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (items, err) = client
        .assessments()
        .all_by_asset("asset_01", Some(ListOptions::with_limit(2)))
        .collect()
        .await;

    assert!(err.is_none(), "unexpected error: {err:?}");
    let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["a1", "a2", "a3"]);
}

#[tokio::test]
async fn maps_error_envelope_to_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/assets/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "ERR_NOT_FOUND",
            "error": "Not Found",
            "message": "asset not found"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.assets().get("missing").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.code(), Some("ERR_NOT_FOUND"));
    assert_eq!(
        err.to_string(),
        "asset not found (status=404, code=ERR_NOT_FOUND)"
    );
}

#[tokio::test]
async fn maps_plain_body_with_status_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/reports/r1/summary"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.reports().get_summary("r1").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.code(), Some("FST_ERR_VALIDATION"));
}

#[tokio::test]
async fn retries_flaky_endpoint_until_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/assessments/asmt_01"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/assessments/asmt_01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "asmt_01",
            "name": "run",
            "assetId": "asset_01",
            "organizationId": "org_01",
            "state": "running",
            "progress": 0.5,
            "attackCredits": 10,
            "createdAt": "2026-02-01T10:00:00Z",
            "updatedAt": "2026-02-01T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let assessment = client.assessments().get("asmt_01").await.unwrap();
    assert_eq!(assessment.id, "asmt_01");
}

#[tokio::test]
async fn post_is_not_retried_by_default() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/webhooks/wh_01/ping"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.webhooks().ping("wh_01").await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn downloads_report_bytes() {
    let server = MockServer::start().await;
    let pdf = b"%PDF-1.7 fake".to_vec();

    Mock::given(method("GET"))
        .and(path("/api/v1/reports/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(pdf.clone()))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let bytes = client.reports().get("r1").await.unwrap();
    assert_eq!(bytes, pdf);
}

#[tokio::test]
async fn fetches_signing_keys() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/meta/webhooks/signing-keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"publicKey": "MCowBQYDK2VwAyEAGb9ECWmEzf6FQbrBZ9w7lshQhqowtrbLDFw4rXAxZuE="}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let keys = client.meta().get_webhook_signing_keys().await.unwrap();
    assert_eq!(keys.len(), 1);
    assert!(keys[0].public_key.starts_with("MCowBQYDK2VwAyEA"));
}
