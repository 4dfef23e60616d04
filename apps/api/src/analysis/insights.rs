//! Derived insights shown next to an analysis: score band and top-skill coverage.

use std::collections::HashSet;

use serde::Serialize;

use crate::analysis::comparison::AnalysisResult;
use crate::analysis::profile::CandidateProfile;

/// How many top technical skills the coverage list reports.
pub const TOP_SKILLS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Strong,
    Moderate,
    Weak,
}

impl ScoreBand {
    /// ≥75 strong, ≥50 moderate, otherwise weak.
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            ScoreBand::Strong
        } else if score >= 50.0 {
            ScoreBand::Moderate
        } else {
            ScoreBand::Weak
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillCoverage {
    pub name: String,
    pub frequency: f64,
    pub matched: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub score_band: ScoreBand,
    pub top_skill_coverage: Vec<SkillCoverage>,
}

pub fn build_insights(result: &AnalysisResult, profile: &CandidateProfile) -> Insights {
    Insights {
        score_band: ScoreBand::from_score(result.match_score),
        top_skill_coverage: skill_coverage(result, profile, TOP_SKILLS),
    }
}

/// Top `limit` technical skills, each flagged when the resume matched it (case-insensitive).
pub fn skill_coverage(
    result: &AnalysisResult,
    profile: &CandidateProfile,
    limit: usize,
) -> Vec<SkillCoverage> {
    let matched: HashSet<String> = result
        .matching_keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .collect();

    profile
        .technical_skills
        .iter()
        .take(limit)
        .map(|skill| SkillCoverage {
            name: skill.name.clone(),
            frequency: skill.frequency,
            matched: matched.contains(&skill.name.trim().to_lowercase()),
        })
        .collect()
}
