//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

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
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// Engine error
    Engine(EngineError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Engine(e) => {
                let msg = e.to_string();
                match e {
                    EngineError::UnknownLine(line) => (
                        StatusCode::NOT_FOUND,
                        ApiError::new("NOT_FOUND", msg).with_details(format!("line_id={}", line)),
                    ),
                    EngineError::InvalidInput(_) => {
                        (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
                    }
                    EngineError::UpstreamUnavailable(_) => (
                        StatusCode::BAD_GATEWAY,
                        ApiError::new("UPSTREAM_UNAVAILABLE", msg),
                    ),
                    EngineError::Configuration(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiError::new("CONFIGURATION_ERROR", msg),
                    ),
                }
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        AppError::Engine(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_status_codes() {
        let cases = [
            (EngineError::UnknownLine("red".into()), StatusCode::NOT_FOUND),
            (EngineError::invalid_input("NaN"), StatusCode::BAD_REQUEST),
            (EngineError::upstream("timeout"), StatusCode::BAD_GATEWAY),
            (EngineError::configuration("bad"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_not_found_status() {
        let response = AppError::NotFound("view x".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
