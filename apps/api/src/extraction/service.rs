//! Chooses between the local pipeline and the remote model for each request.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::extraction::remote::{RemoteExtractionError, RemoteExtractor};
use crate::extraction::{compute_confidence, extract_basic_resume_data};
use crate::models::resume::{ResumeDocument, ResumeRecord};
use crate::retry::{with_retry, RetryPolicy};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Local heuristics only.
    Basic,
    /// Remote model only; its errors reach the caller.
    Ai,
    /// Local first, remote when local confidence is low.
    #[default]
    Auto,
}

impl FromStr for ExtractionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(ExtractionMode::Basic),
            "ai" => Ok(ExtractionMode::Ai),
            "auto" | "" => Ok(ExtractionMode::Auto),
            other => Err(format!(
                "unknown extraction mode '{other}', expected basic, ai or auto"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionSource {
    Heuristic,
    Remote,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResponse {
    pub extraction_id: Uuid,
    pub extracted_at: DateTime<Utc>,
    pub mode: ExtractionMode,
    pub source: ExtractionSource,
    pub confidence: f64,
    pub warnings: Vec<String>,
    pub resume: ResumeRecord,
    pub document: ResumeDocument,
}

impl ExtractionResponse {
    fn new(
        mode: ExtractionMode,
        source: ExtractionSource,
        resume: ResumeRecord,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            extraction_id: Uuid::new_v4(),
            extracted_at: Utc::now(),
            mode,
            source,
            confidence: compute_confidence(&resume),
            warnings,
            document: ResumeDocument::from(&resume),
            resume,
        }
    }
}

#[derive(Clone)]
pub struct ExtractionService {
    remote: RemoteExtractor,
    remote_enabled: bool,
    fallback_threshold: f64,
    retry: RetryPolicy,
}

impl ExtractionService {
    pub fn new(
        remote: RemoteExtractor,
        remote_enabled: bool,
        fallback_threshold: f64,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            remote,
            remote_enabled,
            fallback_threshold,
            retry,
        }
    }

    pub async fn extract(
        &self,
        text: &str,
        mode: ExtractionMode,
    ) -> Result<ExtractionResponse, RemoteExtractionError> {
        match mode {
            ExtractionMode::Basic => {
                let record = extract_basic_resume_data(text);
                Ok(ExtractionResponse::new(
                    mode,
                    ExtractionSource::Heuristic,
                    record,
                    Vec::new(),
                ))
            }
            ExtractionMode::Ai => {
                let record = self.extract_remote(text).await?;
                Ok(ExtractionResponse::new(
                    mode,
                    ExtractionSource::Remote,
                    record,
                    Vec::new(),
                ))
            }
            ExtractionMode::Auto => Ok(self.extract_auto(text).await),
        }
    }

    async fn extract_auto(&self, text: &str) -> ExtractionResponse {
        let local = extract_basic_resume_data(text);
        let confidence = compute_confidence(&local);
        if confidence >= self.fallback_threshold {
            info!(confidence, "heuristic extraction accepted");
            return ExtractionResponse::new(
                ExtractionMode::Auto,
                ExtractionSource::Heuristic,
                local,
                Vec::new(),
            );
        }

        if !self.remote_enabled {
            let warning = format!(
                "Low extraction confidence ({confidence:.2}); AI extraction is not configured"
            );
            return ExtractionResponse::new(
                ExtractionMode::Auto,
                ExtractionSource::Heuristic,
                local,
                vec![warning],
            );
        }

        info!(
            confidence,
            threshold = self.fallback_threshold,
            "heuristic confidence below threshold, trying AI extraction"
        );
        match self.extract_remote(text).await {
            Ok(record) => ExtractionResponse::new(
                ExtractionMode::Auto,
                ExtractionSource::Remote,
                record,
                Vec::new(),
            ),
            Err(err) => {
                warn!(kind = err.kind(), "AI extraction failed, using heuristic result: {err}");
                let warning = format!(
                    "AI extraction failed ({}): {err}. Using heuristic result.",
                    err.kind()
                );
                ExtractionResponse::new(
                    ExtractionMode::Auto,
                    ExtractionSource::Heuristic,
                    local,
                    vec![warning],
                )
            }
        }
    }

    /// Only upstream outages are retried; rate limits and bad output are final.
    async fn extract_remote(&self, text: &str) -> Result<ResumeRecord, RemoteExtractionError> {
        if !self.remote_enabled {
            return Err(RemoteExtractionError::UpstreamUnavailable(
                "Together.ai API key is not configured".to_string(),
            ));
        }
        with_retry(
            self.retry,
            |err| matches!(err, RemoteExtractionError::UpstreamUnavailable(_)),
            || self.remote.extract(text),
        )
        .await
    }

    pub async fn list_models(&self) -> Result<Value, RemoteExtractionError> {
        if !self.remote_enabled {
            return Err(RemoteExtractionError::UpstreamUnavailable(
                "Together.ai API key is not configured".to_string(),
            ));
        }
        self.remote.list_models().await
    }
}
