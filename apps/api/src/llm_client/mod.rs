/// LLM Client: the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// Prompts live with the feature that owns them; this module owns transport,
/// JSON extraction and the retry loop.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod extract;
pub mod prompts;
pub mod retry;

use extract::{parse_json, ExtractError};
use retry::{with_retries, RetryPolicy};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error(transparent)]
    Malformed(#[from] ExtractError),

    #[error(
        "The AI failed to provide a valid response after {attempts} attempts. Last error: {last_error}"
    )]
    ExhaustedRetries { attempts: u32, last_error: String },
}

/// Per-call knobs for a single `generateContent` request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    /// Enables the Google Search grounding tool.
    pub grounding: bool,
    pub temperature: f32,
    /// Asks the model for `application/json` output directly.
    /// Gemini rejects this together with grounding, so never set both.
    pub json_response: bool,
}

impl GenerateOptions {
    /// Profile synthesis: grounded in live postings, low temperature.
    pub fn profile() -> Self {
        Self {
            grounding: true,
            temperature: 0.2,
            json_response: false,
        }
    }

    /// Resume comparison: no search, moderate temperature, JSON output.
    pub fn comparison() -> Self {
        Self {
            grounding: false,
            temperature: 0.5,
            json_response: true,
        }
    }
}

/// One network round-trip: prompt in, raw model text out. Implementations must not retry.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(prompt: &'a str, options: &GenerateOptions) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            tools: if options.grounding {
                vec![Tool {
                    google_search: GoogleSearch {},
                }]
            } else {
                Vec::new()
            },
            generation_config: GenerationConfig {
                temperature: options.temperature,
                response_mime_type: options.json_response.then_some("application/json"),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Gemini `generateContent` client. Built once at startup and shared through `AppState`.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl LlmClient {
    /// Fails fast with `LlmError::Configuration` when the key is blank,
    /// before any request is attempted.
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::Configuration(
                "API key not found. Set GEMINI_API_KEY (or API_KEY) in the environment."
                    .to_string(),
            ));
        }
        if model.trim().is_empty() {
            return Err(LlmError::Configuration(
                "Model identifier must not be empty".to_string(),
            ));
        }

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ModelInvoker for LlmClient {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<String, LlmError> {
        let request_body = GenerateContentRequest::new(prompt, options);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API returned {}: {}", status, body);
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let gemini_response: GenerateContentResponse = response.json().await?;

        if let Some(usage) = &gemini_response.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={}, candidate_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        gemini_response.text().ok_or(LlmError::EmptyContent)
    }
}

/// Invokes the model under `policy` and deserializes the JSON payload of its answer.
pub async fn call_json<T: DeserializeOwned>(
    invoker: &dyn ModelInvoker,
    prompt: &str,
    options: &GenerateOptions,
    policy: &RetryPolicy,
) -> Result<T, LlmError> {
    with_retries(
        policy,
        || invoker.generate(prompt, options),
        |text| parse_json::<T>(text).map_err(LlmError::from),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_api_key_is_configuration_error() {
        let err = LlmClient::new(
            "  ".to_string(),
            DEFAULT_MODEL.to_string(),
            DEFAULT_BASE_URL.to_string(),
            DEFAULT_TIMEOUT,
        )
        .err()
        .unwrap();
        assert!(matches!(err, LlmError::Configuration(_)));
        assert!(err.to_string().contains("API key not found"));
    }

    #[test]
    fn test_endpoint_uses_model_and_trims_base_url() {
        let client = LlmClient::new(
            "key".to_string(),
            "gemini-2.5-flash".to_string(),
            "http://localhost:9000/v1beta/".to_string(),
            DEFAULT_TIMEOUT,
        )
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_profile_request_enables_search_without_json_mime() {
        let body =
            serde_json::to_value(GenerateContentRequest::new("hi", &GenerateOptions::profile()))
                .unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(body["tools"][0]["googleSearch"], serde_json::json!({}));
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert!(body["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_comparison_request_asks_for_json_without_tools() {
        let body = serde_json::to_value(GenerateContentRequest::new(
            "hi",
            &GenerateOptions::comparison(),
        ))
        .unwrap();
        assert!(body.get("tools").is_none());
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_response_text_concatenates_parts() {
        let json = r#"{
            "candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": " 1}"}]}}],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 4}
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"a\": 1}"));
        assert_eq!(response.usage_metadata.unwrap().prompt_token_count, 10);
    }

    #[test]
    fn test_response_without_candidates_has_no_text() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(response.text().is_none());
    }

    struct CannedInvoker(&'static str);

    #[async_trait]
    impl ModelInvoker for CannedInvoker {
        async fn generate(&self, _: &str, _: &GenerateOptions) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_call_json_extracts_typed_payload() {
        #[derive(Debug, Deserialize)]
        struct Score {
            #[serde(rename = "matchScore")]
            match_score: u32,
        }

        let invoker = CannedInvoker("Here you go:\n```json\n{\"matchScore\": 64}\n```");
        let score: Score = call_json(
            &invoker,
            "prompt",
            &GenerateOptions::comparison(),
            &RetryPolicy::default(),
        )
        .await
        .unwrap();
        assert_eq!(score.match_score, 64);
    }
}
