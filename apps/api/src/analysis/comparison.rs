//! Resume comparison: scores resume text against a candidate profile.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::profile::CandidateProfile;
use crate::analysis::prompts::build_comparison_prompt;
use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::{call_json, GenerateOptions, LlmError, ModelInvoker};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// 0 – 100
    pub match_score: f64,
    pub matching_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub recommendations: Vec<String>,
}

impl AnalysisResult {
    /// Clamps the score into 0–100 and drops blank list items.
    pub fn normalized(mut self) -> Self {
        self.match_score = if self.match_score.is_finite() {
            self.match_score.clamp(0.0, 100.0)
        } else {
            0.0
        };
        for list in [
            &mut self.matching_keywords,
            &mut self.missing_keywords,
            &mut self.recommendations,
        ] {
            list.retain(|item| !item.trim().is_empty());
        }
        self
    }
}

pub async fn compare_resume_to_profile(
    resume_text: &str,
    profile: &CandidateProfile,
    llm: &dyn ModelInvoker,
    policy: &RetryPolicy,
) -> Result<AnalysisResult, LlmError> {
    let prompt = build_comparison_prompt(resume_text, profile);
    let result: AnalysisResult =
        call_json(llm, &prompt, &GenerateOptions::comparison(), policy).await?;
    let result = result.normalized();

    info!(
        "Resume scored {}/100 ({} matching, {} missing keywords)",
        result.match_score,
        result.matching_keywords.len(),
        result.missing_keywords.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::analysis::profile::tests::sample_profile;

    const RESULT_JSON: &str = r#"{
        "matchScore": 72,
        "matchingKeywords": ["Rust", "SQL"],
        "missingKeywords": ["Kubernetes", "CI/CD"],
        "recommendations": [
            "Add a Kubernetes deployment you owned to the Experience section.",
            "Mention the CI/CD pipeline you built at Acme."
        ]
    }"#;

    struct FlakyInvoker {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl ModelInvoker for FlakyInvoker {
        async fn generate(
            &self,
            prompt: &str,
            options: &GenerateOptions,
        ) -> Result<String, LlmError> {
            assert_eq!(*options, GenerateOptions::comparison());
            assert!(prompt.contains("{not a placeholder}"));
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Ok("```json\n{\"matchScore\": 72, \"matchingKeywords\": [\n```".to_string())
            } else {
                Ok(RESULT_JSON.to_string())
            }
        }
    }

    #[test]
    fn test_result_deserializes_camel_case() {
        let result: AnalysisResult = serde_json::from_str(RESULT_JSON).unwrap();
        assert!((result.match_score - 72.0).abs() < f64::EPSILON);
        assert_eq!(result.matching_keywords, vec!["Rust", "SQL"]);
        assert_eq!(result.recommendations.len(), 2);
    }

    #[test]
    fn test_normalized_clamps_score_and_drops_blanks() {
        let result = AnalysisResult {
            match_score: 140.0,
            matching_keywords: vec!["Rust".to_string(), "  ".to_string()],
            missing_keywords: vec![],
            recommendations: vec!["".to_string(), "Quantify impact.".to_string()],
        }
        .normalized();
        assert!((result.match_score - 100.0).abs() < f64::EPSILON);
        assert_eq!(result.matching_keywords, vec!["Rust"]);
        assert_eq!(result.recommendations, vec!["Quantify impact."]);

        let negative = AnalysisResult {
            match_score: -3.0,
            ..result
        }
        .normalized();
        assert_eq!(negative.match_score, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_compare_retries_truncated_output() {
        let invoker = FlakyInvoker {
            failures: 2,
            calls: AtomicU32::new(0),
        };
        let result = compare_resume_to_profile(
            "Rust and SQL developer. {not a placeholder}",
            &sample_profile(),
            &invoker,
            &RetryPolicy::default(),
        )
        .await
        .unwrap();

        assert_eq!(invoker.calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.missing_keywords, vec!["Kubernetes", "CI/CD"]);
    }
}
