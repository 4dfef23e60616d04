//! Candidate profile synthesis: builds the "ideal candidate" for a job title from live postings.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::prompts::build_profile_prompt;
use crate::llm_client::retry::RetryPolicy;
use crate::llm_client::{call_json, GenerateOptions, LlmError, ModelInvoker};

/// A skill, qualification or keyword with its relative importance.
/// `frequency` is a score, not a literal count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub technical_skills: Vec<Skill>,
    pub soft_skills: Vec<Skill>,
    pub qualifications: Vec<Skill>,
    pub keywords: Vec<Skill>,
}

impl CandidateProfile {
    /// Orders every list by descending frequency. Stable, so ties keep model order.
    pub fn into_sorted(mut self) -> Self {
        for list in [
            &mut self.technical_skills,
            &mut self.soft_skills,
            &mut self.qualifications,
            &mut self.keywords,
        ] {
            list.sort_by(|a, b| b.frequency.total_cmp(&a.frequency));
        }
        self
    }

    pub fn is_sorted(&self) -> bool {
        [
            &self.technical_skills,
            &self.soft_skills,
            &self.qualifications,
            &self.keywords,
        ]
        .iter()
        .all(|list| is_sorted_by_frequency(list))
    }
}

pub fn is_sorted_by_frequency(skills: &[Skill]) -> bool {
    skills.windows(2).all(|w| w[0].frequency >= w[1].frequency)
}

/// Asks the grounded model for a profile of `job_title` and returns it sorted.
pub async fn generate_profile(
    job_title: &str,
    llm: &dyn ModelInvoker,
    policy: &RetryPolicy,
) -> Result<CandidateProfile, LlmError> {
    info!("Generating candidate profile for '{}'", job_title);
    let prompt = build_profile_prompt(job_title);
    let profile: CandidateProfile =
        call_json(llm, &prompt, &GenerateOptions::profile(), policy).await?;

    if !profile.is_sorted() {
        debug!("Model returned unsorted lists for '{}'; re-sorting", job_title);
    }
    info!(
        "Profile for '{}': {} technical, {} soft, {} qualifications, {} keywords",
        job_title,
        profile.technical_skills.len(),
        profile.soft_skills.len(),
        profile.qualifications.len(),
        profile.keywords.len()
    );
    Ok(profile.into_sorted())
}
