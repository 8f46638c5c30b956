//! Ingress guardrail: refuse oversized bodies before anything reads them.

use crate::dtos::ApiFailure;
use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

/// Largest declared `Content-Length` accepted, in bytes.
pub const MAX_BODY_BYTES: u64 = 50_000;

/// Reject requests whose declared length exceeds [`MAX_BODY_BYTES`].
///
/// Requests without a usable `Content-Length` (chunked uploads) pass through
/// and are bounded by the extractor's own body limit.
pub async fn content_length_guard(req: Request, next: Next) -> Response {
    let declared = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    match declared {
        Some(len) if len > MAX_BODY_BYTES => {
            tracing::debug!(content_length = len, "Rejected oversized request");
            (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ApiFailure::new("", "Payload too large.")),
            )
                .into_response()
        }
        _ => next.run(req).await,
    }
}
