//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

use warmup_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Optional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&AppError> for ApiErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            error: err.kind.code().to_string(),
            message: err.message.clone(),
            details: None,
        }
    }
}

/// An `AppError` on its way out of a handler.
#[derive(Debug)]
pub struct ApiError {
    /// The domain error.
    pub error: AppError,
    /// Field-level details, for validation failures.
    pub details: Option<serde_json::Value>,
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidArgument | ErrorKind::Serialization => StatusCode::BAD_REQUEST,
        ErrorKind::InvalidState | ErrorKind::RetriesExhausted => StatusCode::CONFLICT,
        ErrorKind::PersistenceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Configuration | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self {
            error,
            details: None,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self {
            error: AppError::invalid_argument(format!("Validation failed: {errors}")),
            details: serde_json::to_value(errors.field_errors()).ok(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.error.kind);
        if status.is_server_error() {
            tracing::error!(kind = %self.error.kind, error = %self.error, "Request failed");
        }

        let mut body = ApiErrorResponse::from(&self.error);
        body.details = self.details;
        (status, Json(body)).into_response()
    }
}
