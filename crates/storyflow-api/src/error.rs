//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use storyflow_core::error::StoryError;
use storyflow_graph_store::SeedError;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Seed documents could not be loaded.
    #[error("seed error: {0}")]
    Seed(#[from] SeedError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Blocking diagnostics behind a refused commit.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

/// HTTP-layer wrapper around `StoryError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub StoryError);

impl From<StoryError> for ApiError {
    fn from(err: StoryError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            StoryError::Structural(_) => (StatusCode::CONFLICT, "structural_error"),
            StoryError::ValidationFailed { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_failed")
            }
            StoryError::GraphNotFound(_) => (StatusCode::NOT_FOUND, "graph_not_found"),
            StoryError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            StoryError::NoActiveGraph => (StatusCode::CONFLICT, "no_active_graph"),
            StoryError::HandlerConflict(_) => (StatusCode::CONFLICT, "handler_conflict"),
            StoryError::Resolution { .. } => (StatusCode::BAD_GATEWAY, "resolution_error"),
            StoryError::Handler(_) => (StatusCode::INTERNAL_SERVER_ERROR, "handler_error"),
            StoryError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        let message = self.0.to_string();
        let issues = match self.0 {
            StoryError::ValidationFailed { issues, .. } => issues,
            _ => Vec::new(),
        };

        let body = ErrorBody {
            error: error_code,
            message,
            issues,
        };

        (status, Json(body)).into_response()
    }
}
