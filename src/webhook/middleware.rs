//! Axum middleware wiring for [`WebhookVerifier`]

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::WebhookVerifier;

/// Reject requests whose webhook signature does not verify.
///
/// Mount with `middleware::from_fn_with_state(verifier, verify_middleware)`.
/// Rejections respond `401 Unauthorized` with the rejection reason as a
/// plain-text body; accepted requests reach the inner handler with their
/// body intact.
pub async fn verify_middleware(
    State(verifier): State<Arc<WebhookVerifier>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let (req, result) = verifier.verify_request(req).await;

    match result {
        Ok(()) => next.run(req).await,
        Err(err) => {
            warn!(code = err.code(), "rejected webhook delivery: {err}");
            (StatusCode::UNAUTHORIZED, err.to_string()).into_response()
        }
    }
}
