// Prompt builders for profile synthesis and resume comparison.
// Pure string construction: these never fail and never escape caller input.

use crate::analysis::profile::CandidateProfile;
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, SKILL_LIST_SHAPE};

/// Profile prompt template. Replace `{job_title}`, `{skill_list_shape}`, `{json_only}`.
pub const PROFILE_PROMPT_TEMPLATE: &str = r#"You are an expert recruitment analyst with access to Google Search.
Your task is to analyze the current job market for the role of a '{job_title}'.
1.  Perform a Google Search to find multiple real, recent, and diverse job descriptions for this role.
2.  Based on your search results, synthesize the information to build an ideal candidate profile.
3.  Identify:
    - The top 15 most frequently mentioned technical skills.
    - The top 10 most frequently mentioned soft skills.
    - The top 5 required qualifications (like degrees, certifications, or years of experience).
    - A list of 20-30 other important keywords (e.g., specific tools, methodologies, industry terms).

Return the result as a single JSON object with keys: "technicalSkills", "softSkills", "qualifications", and "keywords".
{skill_list_shape}

Expected shape:
{
  "technicalSkills": [{"name": "Python", "frequency": 9.5}],
  "softSkills": [{"name": "Communication", "frequency": 8}],
  "qualifications": [{"name": "Bachelor's degree in Computer Science", "frequency": 7}],
  "keywords": [{"name": "CI/CD", "frequency": 6}]
}

{json_only}"#;

/// Comparison prompt template. Replace `{profile_json}`, `{resume_text}`, `{json_only}`.
pub const COMPARISON_PROMPT_TEMPLATE: &str = r#"You are an expert career coach specializing in resume optimization for ATS systems.
Here is the ideal candidate profile derived from multiple job descriptions:
{profile_json}

And here is the candidate's resume:
---
{resume_text}
---

Perform the following tasks:
1.  **Calculate a match score**: Based on how well the resume aligns with the ideal profile, provide a score from 0 to 100.
2.  **Identify keywords**: List which keywords and skills from the profile's 'technicalSkills' and 'keywords' lists are present in the resume.
3.  **Identify missing keywords**: List the most important keywords and skills from the profile's 'technicalSkills' and 'keywords' lists that are MISSING from the resume.
4.  **Provide recommendations**: Give 3-5 concise, actionable bullet points on how to improve the resume to better match the profile. Focus on incorporating missing keywords naturally.

Return the result as a single JSON object with keys: "matchScore" (number), "matchingKeywords" (array of strings), "missingKeywords" (array of strings), and "recommendations" (an array of strings, where each string is a single recommendation).
{json_only}"#;

pub fn build_profile_prompt(job_title: &str) -> String {
    // Template placeholders first, caller input last, so a title containing
    // "{json_only}" is embedded literally.
    PROFILE_PROMPT_TEMPLATE
        .replace("{skill_list_shape}", SKILL_LIST_SHAPE)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{job_title}", job_title)
}

pub fn build_comparison_prompt(resume_text: &str, profile: &CandidateProfile) -> String {
    // Serializing plain strings and floats cannot fail; fall back to compact Debug just in case.
    let profile_json =
        serde_json::to_string_pretty(profile).unwrap_or_else(|_| format!("{profile:?}"));

    let (head, tail) = COMPARISON_PROMPT_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .split_once("{resume_text}")
        .map(|(h, t)| (h.to_string(), t.to_string()))
        .unwrap_or_default();

    // Resume goes in verbatim and is never scanned for placeholders.
    let mut prompt = head.replace("{profile_json}", &profile_json);
    prompt.reserve(resume_text.len() + tail.len());
    prompt.push_str(resume_text);
    prompt.push_str(&tail);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::profile::tests::sample_profile;

    #[test]
    fn test_profile_prompt_embeds_title_and_requirements() {
        let prompt = build_profile_prompt("Senior Product Manager");
        assert!(prompt.contains("'Senior Product Manager'"));
        assert!(prompt.contains("Google Search"));
        assert!(prompt.contains("top 15 most frequently mentioned technical skills"));
        assert!(prompt.contains("top 10 most frequently mentioned soft skills"));
        assert!(prompt.contains("top 5 required qualifications"));
        assert!(prompt.contains("20-30 other important keywords"));
        assert!(prompt.contains("descending order"));
        assert!(prompt.contains("single, valid JSON object and nothing else"));
        assert!(!prompt.contains("{skill_list_shape}"));
        assert!(!prompt.contains("{json_only}"));
    }

    #[test]
    fn test_profile_prompt_keeps_placeholder_like_titles_literal() {
        let prompt = build_profile_prompt("Engineer {json_only}");
        assert!(prompt.contains("'Engineer {json_only}'"));
    }

    #[test]
    fn test_comparison_prompt_embeds_profile_and_resume_verbatim() {
        let resume = "Jane Doe\nSkills: Rust, {templating}, [arrays]\n{profile_json}";
        let prompt = build_comparison_prompt(resume, &sample_profile());

        assert!(prompt.contains(&format!("---\n{resume}\n---")));
        assert!(prompt.contains("\"technicalSkills\""));
        assert!(prompt.contains("\"name\": \"Kubernetes\""));
        assert!(prompt.contains("score from 0 to 100"));
        assert!(prompt.contains("3-5 concise, actionable"));
        assert!(prompt.contains("\"matchScore\" (number)"));
        assert!(!prompt.contains("{json_only}"));
        // the resume's own placeholder text is not substituted
        assert_eq!(prompt.matches("{profile_json}").count(), 1);
    }

    #[test]
    fn test_comparison_prompt_with_empty_resume_still_builds() {
        let prompt = build_comparison_prompt("", &sample_profile());
        assert!(prompt.contains("---\n\n---"));
    }
}
