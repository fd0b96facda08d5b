// Common DTOs and errors for the public API

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use estatehub_core::StreamError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard error response for API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message describing what went wrong.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Errors surfaced before a stream is opened. Nothing is ever surfaced mid-stream.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No resolvable session
    #[error("Authentication required")]
    Unauthenticated,

    /// Session resolution or stream setup failed
    #[error("Failed to open notification stream")]
    Setup(#[source] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Setup(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StreamError> for ApiError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Unauthenticated => ApiError::Unauthenticated,
            StreamError::Setup(source) => ApiError::Setup(source),
            StreamError::TransientQuery { source, .. } => ApiError::Setup(source),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Setup(source) = &self {
            tracing::error!(error = %source, "Notification stream setup failed");
        }
        let status = self.status();
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
