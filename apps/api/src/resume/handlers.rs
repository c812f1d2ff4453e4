//! Axum route handler for the resume endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeSubmission;
use crate::resume::service::generate_resume;
use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeResponse {
    pub resume_url: String,
}

/// POST /api/resume
///
/// Merges the submitted form data into the selected template and returns the
/// PDF inline as `{"resumeUrl": "data:application/pdf;base64,..."}`.
/// Malformed bodies fail the same way as merge errors: a generic 500.
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = payload.map_err(|e| AppError::InvalidPayload(e.body_text()))?;
    let submission =
        ResumeSubmission::from_value(body).map_err(|e| AppError::InvalidPayload(e.to_string()))?;
    let request_id = Uuid::new_v4();

    let generated = generate_resume(
        state.merger.as_ref(),
        &state.templates,
        &state.scratch,
        request_id,
        submission,
    )
    .await?;

    Ok((
        [(REQUEST_ID_HEADER, generated.request_id.to_string())],
        Json(ResumeResponse {
            resume_url: generated.resume_url,
        }),
    ))
}
