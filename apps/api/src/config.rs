use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::retry::{DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT};

/// Application configuration loaded from environment variables.
/// Resolved once at startup; fails fast if the Gemini credential is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub llm_max_attempts: u32,
    pub llm_retry_base: Duration,
    pub llm_timeout: Duration,
    /// Redis-backed profile cache when set; in-memory otherwise.
    pub redis_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Unset and blank values read the same.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Config {
            gemini_api_key: get("GEMINI_API_KEY")
                .or_else(|| get("API_KEY"))
                .context(
                    "API key not found. Set GEMINI_API_KEY (or API_KEY) in the environment.",
                )?,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            llm_max_attempts: parse_value(&get, "LLM_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            llm_retry_base: Duration::from_millis(parse_value(
                &get,
                "LLM_RETRY_BASE_MS",
                DEFAULT_BASE_DELAY.as_millis() as u64,
            )?),
            llm_timeout: Duration::from_secs(parse_value(
                &get,
                "LLM_TIMEOUT_SECS",
                DEFAULT_TIMEOUT.as_secs(),
            )?),
            redis_url: get("REDIS_URL"),
            port: parse_value(&get, "PORT", 8080)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_value<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
