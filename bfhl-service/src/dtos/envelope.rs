//! Fixed-shape response bodies.
//!
//! Every endpoint answers with either [`ApiSuccess`] or [`ApiFailure`]; the
//! two never mix, so a success always carries `data` and a failure always
//! carries `error`.

use crate::config::IdentityConfig;
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiSuccess<T> {
    pub is_success: bool,
    pub official_email: String,
    pub data: T,
}

impl<T> ApiSuccess<T> {
    pub fn new(official_email: impl Into<String>, data: T) -> Self {
        Self {
            is_success: true,
            official_email: official_email.into(),
            data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiFailure {
    pub is_success: bool,
    pub official_email: String,
    pub error: String,
}

impl ApiFailure {
    pub fn new(official_email: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            is_success: false,
            official_email: official_email.into(),
            error: error.into(),
        }
    }
}

/// An [`AppError`] paired with the identity to stamp on its envelope.
#[derive(Debug)]
pub struct ApiError {
    official_email: String,
    error: AppError,
}

impl ApiError {
    pub fn new(identity: &IdentityConfig, error: AppError) -> Self {
        Self {
            official_email: identity.official_email().to_string(),
            error,
        }
    }

    pub fn error(&self) -> &AppError {
        &self.error
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.error.log();
        let status = self.error.status_code();
        let body = ApiFailure::new(self.official_email, self.error.public_message());
        (status, Json(body)).into_response()
    }
}
