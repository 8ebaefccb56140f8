//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::dto::BatchRejection;
use crate::db::repository::RepositoryError;
use crate::services::{BatchRowIssue, QualityError};

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (validation error)
    BadRequest(String),
    /// No credential on a protected route
    Unauthorized(String),
    /// Credential present but not accepted
    Forbidden(String),
    /// Some rows of a batch failed validation
    BatchRejected(Vec<BatchRowIssue>),
    /// Internal server error
    Internal(String),
    /// Repository error
    Repository(RepositoryError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::BatchRejected(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Repository(e) => match e {
                RepositoryError::NotFound { .. } => StatusCode::NOT_FOUND,
                RepositoryError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                RepositoryError::ConnectionError { .. } => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::BadRequest(msg) => ApiError::new("BAD_REQUEST", msg),
            AppError::Unauthorized(msg) => ApiError::new("UNAUTHORIZED", msg),
            AppError::Forbidden(msg) => ApiError::new("FORBIDDEN", msg),
            AppError::BatchRejected(invalid) => {
                let body = BatchRejection {
                    message: "Validation failed for some rows".to_string(),
                    invalid,
                };
                return (status, Json(body)).into_response();
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ApiError::new("INTERNAL_ERROR", msg)
            }
            AppError::Repository(e) => {
                let code = match status {
                    StatusCode::NOT_FOUND => "NOT_FOUND",
                    StatusCode::BAD_REQUEST => "VALIDATION_ERROR",
                    _ => "REPOSITORY_ERROR",
                };
                if status.is_server_error() {
                    tracing::error!("Repository error: {}", e);
                }
                let mut error = ApiError::new(code, e.message());
                if let Some(details) = e.context().details.clone() {
                    error = error.with_details(details);
                }
                error
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<QualityError> for AppError {
    fn from(err: QualityError) -> Self {
        match err {
            QualityError::InvalidArgument { .. } => AppError::BadRequest(err.to_string()),
            QualityError::InvalidConfiguration(_) => AppError::Internal(err.to_string()),
        }
    }
}
