use crate::dtos::{ApiError, ApiSuccess, Operation, OperationOutput};
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;

/// `POST /bfhl`: decode the single-key body, run the operation, wrap the result.
pub async fn bfhl(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ApiSuccess<OperationOutput>>, ApiError> {
    let identity = &state.config.identity;
    process(&state, body)
        .await
        .map(Json)
        .map_err(|e| ApiError::new(identity, e))
}

async fn process(
    state: &AppState,
    body: Result<Bytes, BytesRejection>,
) -> Result<ApiSuccess<OperationOutput>, AppError> {
    let email = state.config.identity.verified()?;

    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::bad_request(rejection.body_text())
        }
    })?;

    let operation = Operation::from_body(&body)?;
    tracing::debug!(operation = operation.key(), "Dispatching request");

    let data = state.dispatcher.execute(operation).await?;
    Ok(ApiSuccess::new(email, data))
}
