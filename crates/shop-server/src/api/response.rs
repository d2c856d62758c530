//! API response types
//!
//! Every endpoint answers with `{success, data, meta?}` or
//! `{success: false, error: {code, message}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Standard success response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            meta: None,
        }
    }

    pub fn success_with_meta(data: T, meta: serde_json::Value) -> Self {
        Self {
            success: true,
            data,
            meta: Some(meta),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Standard error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    /// Pair the body with `status`
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }

    pub fn bad_request(message: impl Into<String>) -> Response {
        Self::new("VALIDATION_ERROR", message).into_response_with(StatusCode::BAD_REQUEST)
    }

    pub fn not_found(message: impl Into<String>) -> Response {
        Self::new("NOT_FOUND", message).into_response_with(StatusCode::NOT_FOUND)
    }

    /// Log `err` and answer with a generic 500
    pub fn database(err: &sqlx::Error) -> Response {
        tracing::error!(error = %err, "Database error");
        Self::new("INTERNAL_ERROR", "A database error occurred")
            .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
