/// Document merge — fills a resume template with submission data and returns a PDF.
///
/// Every caller goes through the `DocumentMerger` trait; the concrete backend
/// is picked once at startup from configuration:
/// - `LocalMerger` renders in-process and needs no credentials.
/// - `RemoteMerger` makes one call to an external document-generation service.
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::resume::templates::TemplateVariant;

pub mod local;
pub mod remote;

pub use local::LocalMerger;
pub use remote::RemoteMerger;

/// Output format requested from every backend.
pub const OUTPUT_FORMAT: &str = "pdf";

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Template not found: {0}")]
    TemplateMissing(PathBuf),

    #[error("Failed to read template: {0}")]
    TemplateRead(#[source] std::io::Error),

    #[error("Merge data rejected: {0}")]
    InvalidData(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Merge service error (status {status}): {message}")]
    Service { status: u16, message: String },

    #[error("Merge produced an empty document")]
    EmptyOutput,

    #[error("Render error: {0}")]
    Render(String),
}

/// Everything a backend needs to produce one document.
#[derive(Debug, Clone)]
pub struct MergeJob {
    pub request_id: Uuid,
    pub variant: TemplateVariant,
    /// Template file for `variant`. Backends that do not read templates ignore it.
    pub template_path: PathBuf,
    /// Submission data, already stripped of the template selector.
    pub data: Value,
}

#[async_trait]
pub trait DocumentMerger: Send + Sync {
    /// Merges `job.data` into the template and returns the PDF bytes.
    async fn merge(&self, job: &MergeJob) -> Result<Bytes, MergeError>;

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}
