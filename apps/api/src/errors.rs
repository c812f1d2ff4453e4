use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::merge::MergeError;

/// The only message a client ever sees when generation fails.
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred while generating the resume";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Variants exist for logging; every one of them becomes the same 500 response.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Submission has no content")]
    BlankSubmission,

    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    #[error("Scratch file error: {0}")]
    Scratch(#[from] std::io::Error),

    #[error("Generated document is not a PDF")]
    NotPdf,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::InvalidPayload(msg) => tracing::warn!("Rejected payload: {msg}"),
            AppError::BlankSubmission => tracing::warn!("Rejected blank submission"),
            AppError::Merge(e) => tracing::error!("Document merge failed: {e}"),
            AppError::Scratch(e) => tracing::error!("Scratch file error: {e}"),
            AppError::NotPdf => tracing::error!("Merge output is not a PDF"),
        }

        let body = Json(json!({ "error": GENERIC_FAILURE_MESSAGE }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
