use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::extraction::pdf::{self, PdfUpload};
use crate::extraction::service::{ExtractionMode, ExtractionResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractTextRequest {
    pub text: String,
    #[serde(default)]
    pub mode: ExtractionMode,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::Validation(err.body_text())
    }
}

/// POST /api/v1/resumes/extract
/// Multipart form: `file` (PDF, required) and `mode` (basic | ai | auto, optional).
pub async fn handle_extract_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractionResponse>, AppError> {
    let mut upload: Option<PdfUpload> = None;
    let mut mode = ExtractionMode::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                upload = Some(PdfUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            Some("mode") => {
                let raw = field.text().await.map_err(multipart_error)?;
                mode = raw.parse().map_err(AppError::Validation)?;
            }
            _ => {}
        }
    }

    let upload = upload
        .ok_or_else(|| AppError::Validation("multipart field 'file' is required".to_string()))?;
    info!(
        file = upload.file_name.as_deref().unwrap_or("<unnamed>"),
        bytes = upload.bytes.len(),
        ?mode,
        "resume upload received"
    );

    let text = pdf::extract_text(
        upload,
        state.config.max_upload_bytes,
        state.config.pdf_timeout(),
    )
    .await?;
    let response = state.extraction.extract(&text, mode).await?;
    Ok(Json(response))
}

/// POST /api/v1/resumes/extract-text
pub async fn handle_extract_text(
    State(state): State<AppState>,
    Json(req): Json<ExtractTextRequest>,
) -> Result<Json<ExtractionResponse>, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::Validation("text must not be empty".to_string()));
    }
    if req.text.len() > state.config.max_upload_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "text exceeds the {} byte limit",
            state.config.max_upload_bytes
        )));
    }

    let response = state.extraction.extract(&req.text, req.mode).await?;
    Ok(Json(response))
}

/// GET /api/v1/ai/models
pub async fn handle_list_models(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let models = state.extraction.list_models().await?;
    Ok(Json(models))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
        response::Response,
        Router,
    };
    use serde_json::json;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::extraction::remote::tests::{Reply, StubBackend};
    use crate::extraction::service::tests::service;
    use crate::routes::build_router;

    use super::*;

    const BOUNDARY: &str = "folio-test-boundary";

    fn app(reply: Reply) -> Router {
        let config = Config::from_lookup(|key| match key {
            "MAX_UPLOAD_BYTES" => Some("1024".to_string()),
            _ => None,
        })
        .unwrap();
        let state = AppState {
            config,
            extraction: service(Arc::new(StubBackend::new(reply)), true, 1),
        };
        build_router(state)
    }

    fn stub_app() -> Router {
        app(Reply::Text(r#"{"name": "Jane Roe"}"#.to_string()))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    struct Part<'a> {
        name: &'a str,
        file_name: Option<&'a str>,
        content_type: Option<&'a str>,
        data: &'a [u8],
    }

    fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
            if let Some(file_name) = part.file_name {
                disposition.push_str(&format!("; filename=\"{file_name}\""));
            }
            body.extend_from_slice(format!("{disposition}\r\n").as_bytes());
            if let Some(content_type) = part.content_type {
                body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
            }
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/resumes/extract")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn file_part<'a>(content_type: &'a str, data: &'a [u8]) -> Part<'a> {
        Part {
            name: "file",
            file_name: Some("resume.pdf"),
            content_type: Some(content_type),
            data,
        }
    }

    #[tokio::test]
    async fn test_health() {
        let response = stub_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["service"], "folio-api");
    }

    #[tokio::test]
    async fn test_extract_text_returns_heuristic_result() {
        let response = stub_app()
            .oneshot(json_request(
                "/api/v1/resumes/extract-text",
                json!({
                    "text": "John Doe\njohn@example.com\nSkills\nRust, Go",
                    "mode": "basic"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["source"], "heuristic");
        assert_eq!(body["resume"]["name"], "John Doe");
        assert_eq!(body["resume"]["skills"], json!(["Rust", "Go"]));
        assert_eq!(body["document"]["phone"], "");
    }

    #[tokio::test]
    async fn test_extract_text_rejects_blank_text() {
        let response = stub_app()
            .oneshot(json_request(
                "/api/v1/resumes/extract-text",
                json!({"text": "   "}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_extract_text_rejects_oversized_text() {
        let response = stub_app()
            .oneshot(json_request(
                "/api/v1/resumes/extract-text",
                json!({"text": "a".repeat(2048)}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_ai_rate_limit_maps_to_429() {
        let response = app(Reply::RateLimited(1500))
            .oneshot(json_request(
                "/api/v1/resumes/extract-text",
                json!({"text": "Jane Roe", "mode": "ai"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "2");

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "RATE_LIMITED");
        assert_eq!(body["error"]["retryAfter"], 1500);
    }

    #[tokio::test]
    async fn test_ai_format_error_maps_to_502() {
        let response = app(Reply::Text("```json\n{\"name\": ".to_string()))
            .oneshot(json_request(
                "/api/v1/resumes/extract-text",
                json!({"text": "Jane Roe", "mode": "ai"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["error"]["code"], "REMOTE_FORMAT_ERROR");
    }

    #[tokio::test]
    async fn test_upload_requires_file_field() {
        let response = stub_app()
            .oneshot(multipart_request(&[Part {
                name: "mode",
                file_name: None,
                content_type: None,
                data: b"basic",
            }]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_mode() {
        let response = stub_app()
            .oneshot(multipart_request(&[
                Part {
                    name: "mode",
                    file_name: None,
                    content_type: None,
                    data: b"turbo",
                },
                file_part("application/pdf", b"%PDF-1.4\n%%EOF"),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pdf() {
        let response = stub_app()
            .oneshot(multipart_request(&[file_part("text/plain", b"hello")]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let response = stub_app()
            .oneshot(multipart_request(&[file_part(
                "application/pdf",
                b"PK\x03\x04 zip archive",
            )]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_file() {
        let mut data = b"%PDF-1.4\n".to_vec();
        data.resize(2048, b'0');
        let response = stub_app()
            .oneshot(multipart_request(&[file_part("application/pdf", &data)]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_upload_unreadable_pdf_is_unprocessable() {
        let response = stub_app()
            .oneshot(multipart_request(&[file_part(
                "application/pdf",
                b"%PDF-1.4\n%%EOF",
            )]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_models_proxy() {
        let response = stub_app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/ai/models")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await[0]["id"], "stub-model");
    }
}
