//! Response Extractor: isolates the JSON payload inside free-form model output.
//!
//! Models sometimes wrap JSON in markdown fences or commentary despite being told
//! not to. Extraction tolerates both; schema trust is left to the caller's type.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"```(?:json)?\s*([\s\S]*?)\s*```").expect("fenced block regex is valid")
});

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("AI response did not contain a valid JSON object or array.")]
    NoJsonFound,

    #[error("AI response contained an incomplete JSON object or array.")]
    IncompleteJson,

    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Locates the JSON candidate string inside `text`.
///
/// 1. Trim.
/// 2. A fenced block (optionally tagged `json`) wins if its body is non-empty.
/// 3. Otherwise slice from the first `{` or `[` (whichever comes first) to the
///    LAST occurrence of the matching closer.
pub fn extract_json_candidate(text: &str) -> Result<&str, ExtractError> {
    let text = text.trim();

    if let Some(inner) = FENCED_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .filter(|m| !m.as_str().is_empty())
    {
        return Ok(inner.as_str().trim());
    }

    let first_brace = text.find('{');
    let first_square = text.find('[');

    let (start, closer) = match (first_brace, first_square) {
        (None, None) => {
            warn!("No JSON object or array found in the AI response");
            debug!(response = %text, "unparseable AI response");
            return Err(ExtractError::NoJsonFound);
        }
        (Some(b), None) => (b, '}'),
        (None, Some(s)) => (s, ']'),
        (Some(b), Some(s)) if b < s => (b, '}'),
        (Some(_), Some(s)) => (s, ']'),
    };

    match text.rfind(closer) {
        Some(end) if end >= start => Ok(&text[start..=end]),
        _ => {
            warn!("Malformed JSON structure in the AI response");
            debug!(response = %text, "incomplete AI response");
            Err(ExtractError::IncompleteJson)
        }
    }
}

/// Extracts and deserializes the JSON payload of a model response.
pub fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, ExtractError> {
    let candidate = extract_json_candidate(text)?;
    serde_json::from_str(candidate).map_err(|e| {
        debug!(candidate = %candidate, "failed to parse JSON candidate");
        ExtractError::Parse(e)
    })
}
