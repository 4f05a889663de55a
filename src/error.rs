// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::engine::ExamError;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (attempt state does not allow the request)
    Conflict(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Converts the error into a JSON response with appropriate HTTP status code.
/// Internal details are logged, never returned.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<ExamError> for AppError {
    fn from(err: ExamError) -> Self {
        let msg = err.to_string();
        match err {
            ExamError::AttemptNotFound | ExamError::ExamNotFound | ExamError::UserNotFound => {
                AppError::NotFound(msg)
            }
            ExamError::AlreadySubmitted | ExamError::NotSubmitted => AppError::Conflict(msg),
            ExamError::AlreadyClosed => AppError::BadRequest(msg),
            ExamError::Forbidden => AppError::Forbidden(msg),
            err if err.is_configuration() => {
                AppError::InternalServerError(format!("Blueprint configuration error: {msg}"))
            }
            err if err.is_insufficient_corpus() => {
                AppError::InternalServerError(format!("Question corpus error: {msg}"))
            }
            // Database failures.
            _ => AppError::InternalServerError(msg),
        }
    }
}
