//! The generation pipeline behind `POST /api/resume`.
//!
//! submission → template variant → merge → scratch file round trip → data URL.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::merge::{DocumentMerger, MergeJob};
use crate::models::resume::ResumeSubmission;
use crate::resume::scratch::ScratchDir;
use crate::resume::templates::{TemplateCatalog, TemplateVariant};

pub const PDF_DATA_URL_PREFIX: &str = "data:application/pdf;base64,";
const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Clone)]
pub struct GeneratedResume {
    pub request_id: Uuid,
    /// `data:application/pdf;base64,...`
    pub resume_url: String,
}

/// Generates one resume PDF and returns it as a data URL.
///
/// Blank submissions are refused before anything is merged. The merged
/// document goes through a scratch file keyed by `request_id`, and must
/// start with the PDF header to be accepted.
pub async fn generate_resume(
    merger: &dyn DocumentMerger,
    templates: &TemplateCatalog,
    scratch: &ScratchDir,
    request_id: Uuid,
    submission: ResumeSubmission,
) -> Result<GeneratedResume, AppError> {
    if submission.is_blank() {
        return Err(AppError::BlankSubmission);
    }

    let variant = TemplateVariant::from_resume_type(submission.resume_type.as_deref());
    let job = MergeJob {
        request_id,
        variant,
        template_path: templates.path_for(variant),
        data: submission.merge_data(),
    };

    info!(
        request_id = %request_id,
        variant = %variant,
        backend = merger.backend(),
        "Generating resume"
    );

    let merged = merger.merge(&job).await?;
    let pdf = scratch.persist_and_read(request_id, &merged).await?;

    if !pdf.starts_with(PDF_MAGIC) {
        return Err(AppError::NotPdf);
    }

    info!(request_id = %request_id, bytes = pdf.len(), "Resume generated");

    Ok(GeneratedResume {
        request_id,
        resume_url: to_data_url(&pdf),
    })
}

pub fn to_data_url(pdf: &[u8]) -> String {
    format!("{PDF_DATA_URL_PREFIX}{}", BASE64.encode(pdf))
}
