//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Storage Errors**: database or in-memory store failures
/// - **Owner Errors**: the request carries no usable owner reference
/// - **Validation Errors**: invalid request data
/// - **Configuration Errors**: settings that cannot be used to serve the request
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// Converted automatically from `sqlx::Error` via `#[from]`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Non-database key store failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// No owner reference was supplied with the request.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Missing owner reference")]
    MissingOwner,

    /// The supplied owner reference is empty or too long.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid owner reference")]
    InvalidOwner(String),

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// A configured setting cannot be used (e.g., an unparsable ad-view URL).
    ///
    /// Returns HTTP 500 Internal Server Error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `MissingOwner` → 401 Unauthorized
/// - `InvalidOwner` → 400 Bad Request
/// - `InvalidRequest` → 400 Bad Request
/// - `Database` / `Storage` / `Configuration` → 500 Internal Server Error (details only logged)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::MissingOwner => (StatusCode::UNAUTHORIZED, "missing_owner", self.to_string()),
            AppError::InvalidOwner(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_owner", msg.clone())
            }
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Database(_) | AppError::Storage(_) | AppError::Configuration(_) => {
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
