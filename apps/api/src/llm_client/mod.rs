/// LLM Client — the single point of entry for hosted-model calls in Folio.
///
/// ARCHITECTURAL RULE: No other module may call the Together.ai API directly.
/// Services depend on the `CompletionBackend` trait so tests can swap in a stub.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const MAX_TOKENS: u32 = 3000;
const TEMPERATURE: f32 = 0.1;
const TOP_P: f32 = 0.9;
const TOP_K: u32 = 50;
const REPETITION_PENALTY: f32 = 1.1;
/// Wait applied when a 429 carries neither a `retryAfter` body field nor a `Retry-After` header.
pub const DEFAULT_RETRY_AFTER_MS: u64 = 60_000;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Together.ai API key is not configured")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("Unexpected API response format")]
    UnexpectedShape,
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    repetition_penalty: f32,
}

/// A hosted text-completion provider.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Submits `prompt` and returns the raw completion text.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Returns the provider's model listing as-is.
    async fn list_models(&self) -> Result<Value, LlmError>;
}

/// Together.ai `/inference` and `/models` client.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(
        api_key: Option<String>,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            model,
            base_url,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        self.api_key.as_deref().ok_or(LlmError::MissingApiKey)
    }

    /// Maps non-success statuses onto `LlmError`, passing successful responses through.
    async fn check_status(response: Response) -> Result<Response, LlmError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let header = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = retry_after_ms(header.as_deref(), &body);
            warn!("Together.ai rate limited the request, retry after {retry_after_ms}ms");
            return Err(LlmError::RateLimited { retry_after_ms });
        }

        warn!("Together.ai API returned {status}: {body}");
        Err(LlmError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.api_key()?;
        let request_body = InferenceRequest {
            model: &self.model,
            prompt,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            top_k: TOP_K,
            repetition_penalty: REPETITION_PENALTY,
        };

        let response = self
            .client
            .post(format!("{}/inference", self.base_url))
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;
        let body: Value = Self::check_status(response).await?.json().await?;

        let text = completion_text(&body).ok_or(LlmError::UnexpectedShape)?;
        debug!(model = %self.model, chars = text.len(), "Together.ai completion received");
        Ok(text)
    }

    async fn list_models(&self) -> Result<Value, LlmError> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(api_key)
            .send()
            .await?;
        Ok(Self::check_status(response).await?.json().await?)
    }
}

/// Pulls the completion text out of any of the response shapes Together.ai has used.
pub fn completion_text(body: &Value) -> Option<String> {
    body.pointer("/output/choices/0/text")
        .and_then(Value::as_str)
        .or_else(|| body.get("output").and_then(Value::as_str))
        .or_else(|| body.pointer("/choices/0/text").and_then(Value::as_str))
        .map(str::to_string)
}

/// `retryAfter` (ms) from the body wins over `Retry-After` (seconds) from the header.
pub fn retry_after_ms(header: Option<&str>, body: &str) -> u64 {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("retryAfter").and_then(Value::as_u64))
        .or_else(|| {
            header
                .and_then(|h| h.trim().parse::<u64>().ok())
                .map(|secs| secs.saturating_mul(1000))
        })
        .unwrap_or(DEFAULT_RETRY_AFTER_MS)
}

fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .or_else(|| v.get("error").and_then(Value::as_str))
        })
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}
