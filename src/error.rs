//! Error types for the runtime
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == App Error Enum ==
/// Unified error type for routing, state assembly and rendering.
#[derive(Error, Debug)]
pub enum AppError {
    /// No registered pattern (and no fallback) matched the location
    #[error("Route not found: {0}")]
    RouteNotFound(String),

    /// Invalid configuration supplied at construction time
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed route pattern, rejected at registration
    #[error("Invalid route pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A component constructor failed; nothing was cached
    #[error("Failed to construct {constructor} '{id}': {source}")]
    Construction {
        constructor: String,
        id: String,
        #[source]
        source: anyhow::Error,
    },

    /// The renderer could not mount a view
    #[error("Render error: {0}")]
    Render(String),

    /// A route handler failed
    #[error("Handler failed: {0}")]
    Handler(#[from] anyhow::Error),
}

impl AppError {
    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        AppError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Configuration(_)
            | AppError::InvalidPattern { .. }
            | AppError::Construction { .. }
            | AppError::Render(_)
            | AppError::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the runtime.
pub type Result<T> = std::result::Result<T, AppError>;
