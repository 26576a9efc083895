//! Remote extraction: prompt the hosted model, clean its completion, and coerce
//! the JSON it returns into a `ResumeRecord`.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::extraction::cleaner::clean_record;
use crate::extraction::contact::link_type_for;
use crate::extraction::prompts::build_extraction_prompt;
use crate::llm_client::{CompletionBackend, LlmError};
use crate::models::resume::{EducationEntry, ExperienceEntry, Link, ListEntry, ResumeRecord};
use crate::rate_limit::RateLimiter;

#[derive(Debug, Error)]
pub enum RemoteExtractionError {
    #[error("Failed to parse resume data - {0}")]
    Format(String),

    #[error("Rate limit exceeded, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("AI provider unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl RemoteExtractionError {
    /// Short classification used in warnings and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteExtractionError::Format(_) => "format",
            RemoteExtractionError::RateLimited { .. } => "rate_limited",
            RemoteExtractionError::UpstreamUnavailable(_) => "upstream_unavailable",
        }
    }
}

impl From<LlmError> for RemoteExtractionError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::RateLimited { retry_after_ms } => {
                RemoteExtractionError::RateLimited { retry_after_ms }
            }
            LlmError::UnexpectedShape => RemoteExtractionError::Format(err.to_string()),
            other => RemoteExtractionError::UpstreamUnavailable(other.to_string()),
        }
    }
}

static THINK_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)</think><think>.*?</think>").expect("think pair regex is valid"));
static THINK_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("think block regex is valid"));
static THINK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?think>").expect("think tag regex is valid"));

/// Strips reasoning blocks and narrows the text to its outermost `{…}` span.
pub fn clean_completion_text(raw: &str) -> String {
    let text = raw.trim();
    let text = THINK_PAIR.replace_all(text, "");
    let text = THINK_BLOCK.replace_all(&text, "");
    let text = THINK_TAG.replace_all(&text, "");

    // Fenced or not, the payload is whatever sits between the outer braces.
    match (text.find('{'), text.rfind('}')) {
        (Some(first), Some(last)) if last > first => text[first..=last].trim().to_string(),
        _ => text.trim().to_string(),
    }
}

pub fn parse_completion(raw: &str) -> Result<Map<String, Value>, RemoteExtractionError> {
    let cleaned = clean_completion_text(raw);
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) | Err(_) => {
            warn!(chars = raw.len(), "model completion is not a JSON object");
            Err(RemoteExtractionError::Format(
                "invalid JSON response".to_string(),
            ))
        }
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key).and_then(as_text).unwrap_or_default()
}

fn optional_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    Some(field(map, key)).filter(|s| !s.is_empty())
}

fn objects<'a>(map: &'a Map<String, Value>, key: &str) -> impl Iterator<Item = &'a Map<String, Value>> {
    map.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// Skills may arrive as a flat array or grouped by category.
fn skills_from(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(as_text).collect(),
        Some(Value::Object(groups)) => groups
            .values()
            .filter_map(Value::as_array)
            .flatten()
            .filter_map(as_text)
            .collect(),
        Some(Value::String(s)) => s.split(',').map(|t| t.trim().to_string()).collect(),
        _ => Vec::new(),
    }
}

fn list_from(value: Option<&Value>) -> Vec<ListEntry> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| match item {
            Value::String(s) => Some(ListEntry::Text(s.trim().to_string())),
            Value::Object(map) => Some(ListEntry::Record(map.clone())),
            _ => None,
        })
        .collect()
}

fn links_from(value: Option<&Value>) -> Vec<Link> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| match item {
            Value::String(url) => Some(Link {
                link_type: link_type_for(url).to_string(),
                url: url.trim().to_string(),
            }),
            Value::Object(map) => {
                let url = optional_field(map, "url")?;
                let link_type = optional_field(map, "type")
                    .unwrap_or_else(|| link_type_for(&url).to_string());
                Some(Link { link_type, url })
            }
            _ => None,
        })
        .collect()
}

/// Lenient coercion: missing or mistyped fields fall back to defaults.
pub fn record_from_json(map: &Map<String, Value>) -> ResumeRecord {
    ResumeRecord {
        name: field(map, "name"),
        email: optional_field(map, "email"),
        phone: optional_field(map, "phone"),
        location: optional_field(map, "location"),
        summary: optional_field(map, "summary"),
        experience: objects(map, "experience")
            .map(|exp| ExperienceEntry {
                title: field(exp, "title"),
                company: field(exp, "company"),
                duration: field(exp, "duration"),
                description: field(exp, "description"),
            })
            .collect(),
        education: objects(map, "education")
            .map(|edu| EducationEntry {
                degree: field(edu, "degree"),
                institution: field(edu, "institution"),
                year: field(edu, "year"),
            })
            .collect(),
        skills: skills_from(map.get("skills")),
        certifications: list_from(map.get("certifications")),
        languages: list_from(map.get("languages")),
        projects: list_from(map.get("projects")),
        awards: list_from(map.get("awards")),
        links: links_from(map.get("links")),
    }
}

/// Rate-limited front for the hosted model.
#[derive(Clone)]
pub struct RemoteExtractor {
    backend: Arc<dyn CompletionBackend>,
    limiter: Arc<RateLimiter>,
}

impl RemoteExtractor {
    pub fn new(backend: Arc<dyn CompletionBackend>, limiter: Arc<RateLimiter>) -> Self {
        Self { backend, limiter }
    }

    pub async fn extract(&self, text: &str) -> Result<ResumeRecord, RemoteExtractionError> {
        self.limiter
            .try_acquire()
            .map_err(|retry_after_ms| RemoteExtractionError::RateLimited { retry_after_ms })?;

        let prompt = build_extraction_prompt(text);
        let completion = self.backend.complete(&prompt).await?;
        let map = parse_completion(&completion)?;
        debug!(fields = map.len(), "model completion parsed");

        Ok(clean_record(record_from_json(&map)))
    }

    pub async fn list_models(&self) -> Result<Value, RemoteExtractionError> {
        Ok(self.backend.list_models().await?)
    }
}
