//! Uploaded PDF → plain text, via `pdf-extract` on the blocking pool.

use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

const PDF_MAGIC: &[u8] = b"%PDF-";
const ACCEPTED_CONTENT_TYPES: &[&str] = &["application/pdf", "application/octet-stream"];

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("No file was uploaded")]
    Empty,

    #[error("File exceeds the {limit} byte upload limit")]
    TooLarge { limit: usize },

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("File is not a PDF")]
    NotPdf,

    #[error("PDF is password protected")]
    PasswordProtected,

    #[error("PDF contains no extractable text")]
    NoText,

    #[error("PDF could not be parsed: {0}")]
    Malformed(String),

    #[error("PDF text extraction timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone)]
pub struct PdfUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Cheap checks that run before any parsing.
pub fn validate_upload(upload: &PdfUpload, max_bytes: usize) -> Result<(), PdfError> {
    if upload.bytes.is_empty() {
        return Err(PdfError::Empty);
    }
    if upload.bytes.len() > max_bytes {
        return Err(PdfError::TooLarge { limit: max_bytes });
    }
    if let Some(content_type) = upload.content_type.as_deref() {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if !ACCEPTED_CONTENT_TYPES.contains(&essence.as_str()) {
            return Err(PdfError::UnsupportedContentType(content_type.to_string()));
        }
    }
    if !upload.bytes.starts_with(PDF_MAGIC) {
        return Err(PdfError::NotPdf);
    }
    Ok(())
}

pub async fn extract_text(
    upload: PdfUpload,
    max_bytes: usize,
    timeout: Duration,
) -> Result<String, PdfError> {
    validate_upload(&upload, max_bytes)?;

    let size = upload.bytes.len();
    let bytes = upload.bytes;
    let extracted =
        run_blocking_with_timeout(timeout, move || pdf_extract::extract_text_from_mem(&bytes))
            .await?;
    let text = extracted.map_err(|e| classify_parse_error(&format!("{e:?}")))?;

    if text.trim().is_empty() {
        return Err(PdfError::NoText);
    }
    debug!(
        file = upload.file_name.as_deref().unwrap_or("<unnamed>"),
        bytes = size,
        chars = text.len(),
        "PDF text extracted"
    );
    Ok(text)
}

/// Runs CPU-bound parsing on the blocking pool under a deadline. A panic in
/// `work` surfaces as `Malformed`.
async fn run_blocking_with_timeout<T, F>(timeout: Duration, work: F) -> Result<T, PdfError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::task::spawn_blocking(work);
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            warn!("PDF extraction task failed: {e}");
            Err(PdfError::Malformed("the PDF parser aborted".to_string()))
        }
        Err(_) => {
            // The blocking thread cannot be cancelled and keeps parsing.
            warn!(
                timeout_secs = timeout.as_secs_f64(),
                "PDF extraction timed out; parser thread left running detached"
            );
            Err(PdfError::Timeout(timeout))
        }
    }
}

fn classify_parse_error(message: &str) -> PdfError {
    let lower = message.to_lowercase();
    if lower.contains("encrypt") || lower.contains("decrypt") || lower.contains("password") {
        PdfError::PasswordProtected
    } else {
        PdfError::Malformed(message.to_string())
    }
}
