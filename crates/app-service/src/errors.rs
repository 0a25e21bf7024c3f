//! App Service error types.
//!
//! Handler failures are the only condition that crosses the service
//! boundary to the caller; everything the instrumentation core can raise
//! is absorbed locally. Error messages returned to clients are
//! intentionally generic to avoid leaking internal details; actual
//! errors are logged server-side.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Handler-level error type.
///
/// Maps to HTTP status codes via the `IntoResponse` impl:
/// - Internal: 500 Internal Server Error
/// - Unavailable: 503 Service Unavailable
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match &self {
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Handler failed");
                ("internal_error", "Internal server error")
            }
            AppError::Unavailable(detail) => {
                tracing::error!(error = %detail, "Dependency unavailable");
                ("service_unavailable", "Service temporarily unavailable")
            }
        };

        (
            self.status_code(),
            Json(ErrorResponse {
                error: ErrorDetail {
                    code: code.to_string(),
                    message: message.to_string(),
                },
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Internal("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Unavailable("down".to_string()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_into_response_preserves_status() {
        let response = AppError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_client_message_is_generic() {
        // The detail string must not leak into the display shown upstream.
        let error = AppError::Internal("connection string with secrets".to_string());
        let rendered = error.to_string();
        assert!(rendered.starts_with("Internal error"));
    }
}
