use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::controller::ErrorKind;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("LLM error: {0}")]
    Llm(String),
}

impl AppError {
    /// Maps a controller failure onto the HTTP error taxonomy, keeping the
    /// user-facing message.
    pub fn from_failure(kind: ErrorKind, message: String) -> Self {
        match kind {
            ErrorKind::InputValidation => AppError::Validation(message),
            ErrorKind::Extraction | ErrorKind::EmptyContent => {
                AppError::UnprocessableEntity(message)
            }
            ErrorKind::Configuration => AppError::NotConfigured(message),
            ErrorKind::InvalidCredential | ErrorKind::Remote | ErrorKind::Parse => {
                AppError::Llm(message)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::NotConfigured(msg) => {
                tracing::error!("Service not configured: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "NOT_CONFIGURED",
                    msg.clone(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (StatusCode::BAD_GATEWAY, "LLM_ERROR", msg.clone())
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
