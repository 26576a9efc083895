use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_MODEL: &str = "deepseek-ai/DeepSeek-R1-Distill-Llama-70B-free";
const DEFAULT_BASE_URL: &str = "https://api.together.xyz";

/// Application configuration loaded from environment variables.
/// Every setting has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Hosted model key. When absent the remote path reports the service as unavailable.
    pub together_api_key: Option<String>,
    pub together_model: String,
    pub together_base_url: String,
    pub ai_timeout_secs: u64,
    pub ai_rate_limit_max_requests: u32,
    pub ai_rate_limit_window_secs: u64,
    /// Local results scoring below this confidence are re-extracted remotely in `auto` mode.
    pub ai_fallback_threshold: f64,
    pub ai_max_attempts: u32,
    pub max_upload_bytes: usize,
    pub pdf_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let together_api_key = lookup("TOGETHER_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let config = Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            together_api_key,
            together_model: lookup("TOGETHER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            together_base_url: lookup("TOGETHER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            ai_timeout_secs: parse_or(&lookup, "AI_TIMEOUT_SECS", 60)?,
            ai_rate_limit_max_requests: parse_or(&lookup, "AI_RATE_LIMIT_MAX_REQUESTS", 10)?,
            ai_rate_limit_window_secs: parse_or(&lookup, "AI_RATE_LIMIT_WINDOW_SECS", 60)?,
            ai_fallback_threshold: parse_or(&lookup, "AI_FALLBACK_THRESHOLD", 0.6)?,
            ai_max_attempts: parse_or(&lookup, "AI_MAX_ATTEMPTS", 1)?,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            pdf_timeout_secs: parse_or(&lookup, "PDF_TIMEOUT_SECS", 30)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.ai_timeout_secs)
    }

    pub fn ai_rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.ai_rate_limit_window_secs)
    }

    pub fn pdf_timeout(&self) -> Duration {
        Duration::from_secs(self.pdf_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.ai_fallback_threshold) {
            anyhow::bail!("AI_FALLBACK_THRESHOLD must be between 0.0 and 1.0");
        }
        if self.ai_max_attempts == 0 {
            anyhow::bail!("AI_MAX_ATTEMPTS must be at least 1");
        }
        if self.ai_rate_limit_max_requests == 0 {
            anyhow::bail!("AI_RATE_LIMIT_MAX_REQUESTS must be at least 1");
        }
        if self.ai_rate_limit_window_secs == 0 {
            anyhow::bail!("AI_RATE_LIMIT_WINDOW_SECS must be greater than 0");
        }
        if self.max_upload_bytes == 0 {
            anyhow::bail!("MAX_UPLOAD_BYTES must be greater than 0");
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
        assert!(config.together_api_key.is_none());
        assert_eq!(config.together_model, DEFAULT_MODEL);
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.ai_max_attempts, 1);
    }

    #[test]
    fn test_blank_api_key_is_treated_as_missing() {
        let config = config_from(&[("TOGETHER_API_KEY", "   ")]).unwrap();
        assert!(config.together_api_key.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_removed() {
        let config = config_from(&[("TOGETHER_BASE_URL", "http://localhost:9000/")]).unwrap();
        assert_eq!(config.together_base_url, "http://localhost:9000");
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        assert!(config_from(&[("AI_FALLBACK_THRESHOLD", "1.5")]).is_err());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        assert!(config_from(&[("AI_MAX_ATTEMPTS", "0")]).is_err());
    }

    #[test]
    fn test_zero_rate_limit_rejected() {
        assert!(config_from(&[("AI_RATE_LIMIT_MAX_REQUESTS", "0")]).is_err());
        assert!(config_from(&[("AI_RATE_LIMIT_MAX_REQUESTS", "1")]).is_ok());
    }
}
