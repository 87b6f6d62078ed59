//! Error handling module
//!
//! Centralized error types and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::{ScoreError, UnknownEntityKind};

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Body text for every 5xx; the cause only goes to the log
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    UnknownKind(#[from] UnknownEntityKind),

    // Scoring errors
    #[error(transparent)]
    Score(#[from] ScoreError),

    // Server errors (5xx)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 400 Bad Request
            AppError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", Some(msg.clone()))
            }
            AppError::UnknownKind(UnknownEntityKind(kind)) => {
                (StatusCode::BAD_REQUEST, "unknown_entity_kind", Some(kind.clone()))
            }

            AppError::Score(score_err) => match score_err {
                ScoreError::NotFound { id, .. } => {
                    (StatusCode::NOT_FOUND, "not_found", Some(id.to_string()))
                }
                ScoreError::Aggregation(msg) => {
                    tracing::error!("Aggregation error: {}", msg);
                    (StatusCode::INTERNAL_SERVER_ERROR, "aggregation_failure", None)
                }
                ScoreError::Persistence(msg) => {
                    tracing::error!("Persistence error: {}", msg);
                    (StatusCode::INTERNAL_SERVER_ERROR, "persistence_failure", None)
                }
            },

            // 500 Internal Server Error
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let error = if status.is_server_error() {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error,
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
