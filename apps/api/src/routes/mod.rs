use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::post,
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir};

use crate::config::Config;
use crate::resume::handlers;
use crate::state::AppState;

/// `POST /api/resume` plus the static frontend for every other path.
pub fn build_router(state: AppState) -> Router {
    let frontend = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/api/resume", post(handlers::handle_generate_resume))
        .layer(DefaultBodyLimit::max(state.config.body_limit_bytes))
        .fallback_service(frontend)
        .with_state(state)
}

/// CORS policy: a single allowed origin when configured, otherwise permissive.
pub fn cors_layer(config: &Config) -> Result<CorsLayer> {
    let Some(origin) = &config.cors_allowed_origin else {
        return Ok(CorsLayer::permissive());
    };

    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("CORS_ALLOWED_ORIGIN is not a valid origin: '{origin}'"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    use bytes::Bytes;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::config::MergeBackend;
    use crate::errors::GENERIC_FAILURE_MESSAGE;
    use crate::layout::default_page_config;
    use crate::merge::{DocumentMerger, LocalMerger, MergeError, MergeJob};
    use crate::resume::handlers::REQUEST_ID_HEADER;
    use crate::resume::scratch::ScratchDir;
    use crate::resume::service::PDF_DATA_URL_PREFIX;
    use crate::resume::templates::TemplateCatalog;

    /// Answers with a fake PDF whose body is the merge data, so each response
    /// can be traced back to its request.
    struct EchoMerger;

    #[async_trait]
    impl DocumentMerger for EchoMerger {
        async fn merge(&self, job: &MergeJob) -> Result<Bytes, MergeError> {
            let mut out = b"%PDF-echo\n".to_vec();
            out.extend(serde_json::to_vec(&json!({
                "template": job.variant.file_name(),
                "data": job.data,
            }))
            .unwrap());
            Ok(Bytes::from(out))
        }

        fn backend(&self) -> &'static str {
            "echo"
        }
    }

    struct FailingMerger;

    #[async_trait]
    impl DocumentMerger for FailingMerger {
        async fn merge(&self, _job: &MergeJob) -> Result<Bytes, MergeError> {
            Err(MergeError::Service {
                status: 503,
                message: "unavailable".to_string(),
            })
        }

        fn backend(&self) -> &'static str {
            "failing"
        }
    }

    /// Router backed by `merger`, with throwaway static and scratch dirs.
    fn make_app(merger: Arc<dyn DocumentMerger>) -> (Router, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let static_dir = dir.path().join("static");
        let scratch_dir = dir.path().join("scratch");
        std::fs::create_dir_all(&static_dir).unwrap();
        std::fs::create_dir_all(&scratch_dir).unwrap();
        std::fs::write(
            static_dir.join("index.html"),
            "<form id=\"resumeForm\"></form>",
        )
        .unwrap();

        let config = Config {
            port: 0,
            rust_log: "info".to_string(),
            static_dir,
            templates_dir: dir.path().join("templates"),
            scratch_dir: scratch_dir.clone(),
            body_limit_bytes: 64 * 1024,
            cors_allowed_origin: None,
            merge_backend: MergeBackend::Local,
        };
        let state = AppState {
            templates: TemplateCatalog::new(&config.templates_dir),
            scratch: ScratchDir::new(scratch_dir),
            merger,
            config,
        };
        (build_router(state), dir)
    }

    fn post_resume(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/resume")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn decode_resume_url(body: &Value) -> Vec<u8> {
        let url = body["resumeUrl"].as_str().expect("resumeUrl missing");
        let encoded = url
            .strip_prefix(PDF_DATA_URL_PREFIX)
            .expect("resumeUrl is not a PDF data URL");
        BASE64.decode(encoded).unwrap()
    }

    /// The JSON the echo merger embedded after its fake PDF header.
    fn echoed(pdf: &[u8]) -> Value {
        let body = pdf.strip_prefix(b"%PDF-echo\n").unwrap();
        serde_json::from_slice(body).unwrap()
    }

    fn sample_payload() -> Value {
        json!({
            "Name": "Katherine",
            "LastName": "Johnson",
            "EmailAddress": "kj@example.com",
            "PhoneNumber": "555-0199",
            "LinkedIn": "linkedin.com/in/kj",
            "JobTitle": "Research Mathematician",
            "Summary": "Orbital mechanics.",
            "Skills": ["Analytic geometry", "FORTRAN"],
            "Education": [
                { "SchoolName": "West Virginia State", "Year": "1937", "Description": "BS" },
                { "SchoolName": "West Virginia University", "Year": "1939", "Description": "Graduate study" }
            ],
            "Experience": [
                { "CompanyName": "NASA", "Year": "1958", "Description": "Trajectory analysis" }
            ],
            "Achievements": [
                { "Type": "Award", "Description": "Presidential Medal of Freedom" }
            ],
            "resume_type": "2"
        })
    }

    #[tokio::test]
    async fn test_well_formed_payload_returns_pdf_data_url() {
        let (app, _dir) = make_app(Arc::new(EchoMerger));
        let response = app
            .oneshot(post_resume(sample_payload().to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );

        let body = read_json(response).await;
        let pdf = decode_resume_url(&body);
        assert!(pdf.starts_with(b"%PDF-"));

        let merged = echoed(&pdf);
        assert_eq!(merged["template"], "BasicTemplate2.docx");
        assert_eq!(merged["data"]["Name"], "Katherine");
        assert_eq!(merged["data"]["Education"][1]["Year"], "1939");
        assert!(merged["data"].get("resume_type").is_none());
    }

    #[tokio::test]
    async fn test_local_backend_end_to_end() {
        let (app, _dir) = make_app(Arc::new(LocalMerger::new(default_page_config())));
        let response = app
            .oneshot(post_resume(sample_payload().to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let pdf = decode_resume_url(&read_json(response).await);
        assert!(pdf.starts_with(b"%PDF-"));
        assert!(pdf.len() > 500);
    }

    #[tokio::test]
    async fn test_unknown_resume_type_uses_default_template() {
        let (app, _dir) = make_app(Arc::new(EchoMerger));
        let mut payload = sample_payload();
        payload["resume_type"] = json!("9");

        let response = app.oneshot(post_resume(payload.to_string())).await.unwrap();
        let merged = echoed(&decode_resume_url(&read_json(response).await));
        assert_eq!(merged["template"], "BasicTemplate1.docx");
    }

    #[tokio::test]
    async fn test_partial_payload_degrades_gracefully() {
        let (app, _dir) = make_app(Arc::new(EchoMerger));
        let response = app
            .oneshot(post_resume(json!({ "Name": "Katherine" }).to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let merged = echoed(&decode_resume_url(&read_json(response).await));
        assert_eq!(merged["template"], "BasicTemplate1.docx");
        assert_eq!(merged["data"], json!({ "Name": "Katherine" }));
    }

    #[tokio::test]
    async fn test_payload_reaches_merge_untouched() {
        let (app, _dir) = make_app(Arc::new(EchoMerger));
        let payload = json!({
            "Name": "Katherine",
            "Education": [{ "SchoolName": "West Virginia State", "Degree": "BS", "Year": 1937 }],
            "Skills": "Analytic geometry, FORTRAN",
            "resume_type": "3"
        });

        let response = app.oneshot(post_resume(payload.to_string())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let merged = echoed(&decode_resume_url(&read_json(response).await));
        assert_eq!(merged["template"], "BasicTemplate3.docx");
        assert_eq!(
            merged["data"],
            json!({
                "Name": "Katherine",
                "Education": [{ "SchoolName": "West Virginia State", "Degree": "BS", "Year": 1937 }],
                "Skills": "Analytic geometry, FORTRAN"
            })
        );
    }

    #[tokio::test]
    async fn test_invalid_inputs_collapse_to_generic_error() {
        let cases = vec![
            post_resume("{not json"),
            post_resume("[1, 2, 3]"),
            post_resume(json!({ "Education": "MIT" }).to_string()),
            post_resume(json!({}).to_string()),
            Request::builder()
                .method("POST")
                .uri("/api/resume")
                .body(Body::from(sample_payload().to_string()))
                .unwrap(),
        ];

        for request in cases {
            let (app, _dir) = make_app(Arc::new(EchoMerger));
            let response = app.oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                read_json(response).await,
                json!({ "error": GENERIC_FAILURE_MESSAGE })
            );
        }
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let (app, _dir) = make_app(Arc::new(EchoMerger));
        let payload = json!({ "Name": "K", "Summary": "x".repeat(128 * 1024) });
        let response = app.oneshot(post_resume(payload.to_string())).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_merge_failure_returns_generic_error() {
        let (app, _dir) = make_app(Arc::new(FailingMerger));
        let response = app
            .oneshot(post_resume(sample_payload().to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            read_json(response).await,
            json!({ "error": GENERIC_FAILURE_MESSAGE })
        );
    }

    #[tokio::test]
    async fn test_concurrent_submissions_do_not_interfere() {
        let (app, dir) = make_app(Arc::new(EchoMerger));

        let tasks: Vec<_> = (0..24)
            .map(|i| {
                let app = app.clone();
                tokio::spawn(async move {
                    let mut payload = sample_payload();
                    payload["Name"] = json!(format!("Candidate {i}"));
                    payload["resume_type"] = json!(((i % 3) + 1).to_string());
                    let response = app.oneshot(post_resume(payload.to_string())).await.unwrap();
                    assert_eq!(response.status(), StatusCode::OK);
                    (i, echoed(&decode_resume_url(&read_json(response).await)))
                })
            })
            .collect();

        for task in tasks {
            let (i, merged) = task.await.unwrap();
            assert_eq!(merged["data"]["Name"], format!("Candidate {i}"));
            let expected = format!("BasicTemplate{}.docx", (i % 3) + 1);
            assert_eq!(merged["template"], expected.as_str());
        }

        let leftovers = std::fs::read_dir(dir.path().join("scratch")).unwrap().count();
        assert_eq!(leftovers, 0, "scratch files should be cleaned up");
    }

    #[tokio::test]
    async fn test_root_serves_frontend() {
        let (app, _dir) = make_app(Arc::new(EchoMerger));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("resumeForm"));
    }

    #[test]
    fn test_cors_layer_rejects_invalid_origin() {
        let mut config = Config::from_lookup(|_| None).unwrap();
        assert!(cors_layer(&config).is_ok());

        config.cors_allowed_origin = Some("http://bad\norigin".to_string());
        assert!(cors_layer(&config).is_err());

        config.cors_allowed_origin = Some("http://127.0.0.1:5500".to_string());
        assert!(cors_layer(&config).is_ok());
    }
}
