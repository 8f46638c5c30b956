use crate::dtos::{ApiError, ApiSuccess};
use crate::startup::AppState;
use axum::{extract::State, Json};

/// Liveness probe. Fails with the envelope's error shape when the operator
/// identity is missing or invalid.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiSuccess<Option<()>>>, ApiError> {
    let identity = &state.config.identity;
    let email = identity
        .verified()
        .map_err(|e| ApiError::new(identity, e))?;

    Ok(Json(ApiSuccess::new(email, None)))
}
