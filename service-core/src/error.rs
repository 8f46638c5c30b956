use axum::http::StatusCode;
use thiserror::Error;

/// Generic message returned for faults that carry no client-facing detail.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error.";

#[derive(Debug, Error)]
pub enum AppError {
    /// Caller fault. The message names the field or bound that was violated.
    #[error("{0}")]
    BadRequest(String),

    /// Operator fault: the process is running with missing or invalid settings.
    #[error("{0}")]
    Misconfigured(String),

    /// A dependency call failed, timed out, or answered in an unexpected shape.
    #[error("{0}")]
    UpstreamError(String),

    /// A dependency answered, but nothing usable could be extracted.
    #[error("{0}")]
    EmptyAnswer(String),

    #[error("Payload too large.")]
    PayloadTooLarge,

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Misconfigured(_)
            | AppError::UpstreamError(_)
            | AppError::EmptyAnswer(_)
            | AppError::InternalError(_)
            | AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to the caller.
    ///
    /// Unclassified faults collapse to [`INTERNAL_ERROR_MESSAGE`]; their detail
    /// only reaches the server log.
    pub fn public_message(&self) -> String {
        match self {
            AppError::BadRequest(msg)
            | AppError::Misconfigured(msg)
            | AppError::UpstreamError(msg)
            | AppError::EmptyAnswer(msg) => msg.clone(),
            AppError::PayloadTooLarge => self.to_string(),
            AppError::InternalError(_) | AppError::ConfigError(_) => {
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        }
    }

    /// Emit the fault to the server log at a level matching who caused it.
    pub fn log(&self) {
        match self {
            AppError::BadRequest(msg) => tracing::debug!(error = %msg, "Rejected request"),
            AppError::PayloadTooLarge => tracing::debug!("Rejected oversized request"),
            AppError::InternalError(err) | AppError::ConfigError(err) => {
                tracing::error!(error = ?err, "Unhandled server fault")
            }
            other => tracing::error!(error = %other, "Request failed"),
        }
    }
}
