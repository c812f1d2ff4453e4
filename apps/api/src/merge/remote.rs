//! Remote merge backend: a single request to an external document-generation
//! service carrying the docx template and the merge data.
//!
//! One call per submission. No polling and no retries; any failure is
//! reported straight back to the request that triggered it.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::RemoteMergeConfig;
use crate::merge::{DocumentMerger, MergeError, MergeJob, OUTPUT_FORMAT};

/// Longest slice of an unparseable error body kept in the error message.
const MAX_ERROR_BODY: usize = 300;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MergeRequestBody<'a> {
    template_name: &'a str,
    /// Base64-encoded docx.
    template: String,
    output_format: &'a str,
    json_data_for_merge: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    message: Option<String>,
    error: Option<Value>,
}

#[derive(Clone)]
pub struct RemoteMerger {
    client: Client,
    endpoint: String,
    client_id: String,
    client_secret: String,
}

impl RemoteMerger {
    pub fn new(config: &RemoteMergeConfig) -> Result<Self, MergeError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    async fn read_template(&self, job: &MergeJob) -> Result<Vec<u8>, MergeError> {
        tokio::fs::read(&job.template_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MergeError::TemplateMissing(job.template_path.clone())
            } else {
                MergeError::TemplateRead(e)
            }
        })
    }
}

#[async_trait]
impl DocumentMerger for RemoteMerger {
    async fn merge(&self, job: &MergeJob) -> Result<Bytes, MergeError> {
        let template = self.read_template(job).await?;

        let body = MergeRequestBody {
            template_name: job.variant.file_name(),
            template: BASE64.encode(template),
            output_format: OUTPUT_FORMAT,
            json_data_for_merge: &job.data,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.client_id)
            .header("x-request-id", job.request_id.to_string())
            .bearer_auth(&self.client_secret)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = service_error_message(&text);
            warn!(
                request_id = %job.request_id,
                "Merge service returned {}: {}", status, message
            );
            return Err(MergeError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let pdf = response.bytes().await?;
        if pdf.is_empty() {
            return Err(MergeError::EmptyOutput);
        }

        debug!(
            request_id = %job.request_id,
            variant = %job.variant,
            bytes = pdf.len(),
            "Merge service returned document"
        );

        Ok(pdf)
    }

    fn backend(&self) -> &'static str {
        "remote"
    }
}

/// Pulls a readable message out of an error response body.
///
/// Understands `{"message": ".."}`, `{"error": ".."}` and
/// `{"error": {"message": ".."}}`; anything else is returned truncated.
fn service_error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ServiceErrorBody>(body) {
        let nested = match &parsed.error {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Object(map)) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        };
        if let Some(message) = parsed.message.or(nested) {
            return message;
        }
    }
    body.chars().take(MAX_ERROR_BODY).collect()
}
