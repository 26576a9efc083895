use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::pdf::PdfError;
use crate::extraction::remote::RemoteExtractionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMedia(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Remote format error: {0}")]
    RemoteFormat(String),

    #[error("Rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PdfError> for AppError {
    fn from(err: PdfError) -> Self {
        let message = err.to_string();
        match err {
            PdfError::Empty => AppError::Validation(message),
            PdfError::TooLarge { .. } => AppError::PayloadTooLarge(message),
            PdfError::UnsupportedContentType(_) | PdfError::NotPdf => {
                AppError::UnsupportedMedia(message)
            }
            PdfError::PasswordProtected | PdfError::NoText | PdfError::Malformed(_) => {
                AppError::UnprocessableEntity(message)
            }
            PdfError::Timeout(_) => AppError::Timeout(message),
        }
    }
}

impl From<RemoteExtractionError> for AppError {
    fn from(err: RemoteExtractionError) -> Self {
        match err {
            RemoteExtractionError::Format(_) => AppError::RemoteFormat(err.to_string()),
            RemoteExtractionError::RateLimited { retry_after_ms } => {
                AppError::RateLimited { retry_after_ms }
            }
            RemoteExtractionError::UpstreamUnavailable(_) => {
                AppError::UpstreamUnavailable(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                msg.clone(),
            ),
            AppError::UnsupportedMedia(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                msg.clone(),
            ),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::RemoteFormat(msg) => {
                tracing::warn!("Remote format error: {msg}");
                (StatusCode::BAD_GATEWAY, "REMOTE_FORMAT_ERROR", msg.clone())
            }
            AppError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Rate limit exceeded. Please try again later.".to_string(),
            ),
            AppError::UpstreamUnavailable(msg) => {
                tracing::error!("Upstream unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "UPSTREAM_UNAVAILABLE",
                    msg.clone(),
                )
            }
            AppError::Timeout(msg) => {
                tracing::warn!("Timeout: {msg}");
                (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT", msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let AppError::RateLimited { retry_after_ms } = &self {
            error["retryAfter"] = json!(retry_after_ms);
        }

        let mut response = (status, Json(json!({ "error": error }))).into_response();
        if let AppError::RateLimited { retry_after_ms } = self {
            let seconds = retry_after_ms.div_ceil(1000);
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_rate_limited_sets_header_and_body_field() {
        let response = AppError::RateLimited {
            retry_after_ms: 1500,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "2");

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "RATE_LIMITED");
        assert_eq!(body["error"]["retryAfter"], 1500);
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response = AppError::Internal(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert!(!body["error"]["message"].as_str().unwrap().contains("secret"));
    }

    #[test]
    fn test_pdf_errors_map_to_statuses() {
        let cases = [
            (PdfError::Empty, StatusCode::BAD_REQUEST),
            (PdfError::TooLarge { limit: 1 }, StatusCode::PAYLOAD_TOO_LARGE),
            (PdfError::NotPdf, StatusCode::UNSUPPORTED_MEDIA_TYPE),
            (PdfError::PasswordProtected, StatusCode::UNPROCESSABLE_ENTITY),
            (PdfError::NoText, StatusCode::UNPROCESSABLE_ENTITY),
            (
                PdfError::Timeout(std::time::Duration::from_secs(1)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_remote_errors_map_to_statuses() {
        let format = AppError::from(RemoteExtractionError::Format("invalid JSON response".into()));
        assert_eq!(format.into_response().status(), StatusCode::BAD_GATEWAY);

        let upstream = AppError::from(RemoteExtractionError::UpstreamUnavailable("down".into()));
        assert_eq!(upstream.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
