//! Axum route handlers for the Profile and Analysis API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::comparison::{compare_resume_to_profile, AnalysisResult};
use crate::analysis::insights::{build_insights, Insights};
use crate::analysis::profile::{generate_profile, CandidateProfile};
use crate::cache::{list_recent, CacheEntry, ProfileCache};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub job_title: String,
    /// Skip the cache and re-scan live postings.
    #[serde(default)]
    pub force_refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub entry: CacheEntry,
    pub cached: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListProfilesQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub resume_text: String,
    pub job_title: Option<String>,
    /// Takes precedence over the cached profile for `job_title`.
    pub profile: Option<CandidateProfile>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub result: AnalysisResult,
    pub insights: Insights,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/profiles
///
/// Previous searches, newest first. Cache read failures yield an empty list.
pub async fn handle_list_profiles(
    State(state): State<AppState>,
    Query(params): Query<ListProfilesQuery>,
) -> Json<Vec<CacheEntry>> {
    match list_recent(state.cache.as_ref(), params.limit).await {
        Ok(entries) => Json(entries),
        Err(e) => {
            warn!("Failed to read profile cache: {e}");
            Json(Vec::new())
        }
    }
}

/// GET /api/v1/profiles/:job_title
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(job_title): Path<String>,
) -> Result<Json<CacheEntry>, AppError> {
    cached_entry(state.cache.as_ref(), &job_title)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No cached profile for '{}'", job_title.trim())))
}

/// POST /api/v1/profiles
///
/// Returns the cached profile for the title unless `forceRefresh` is set;
/// otherwise synthesizes a new one from live postings and caches it.
pub async fn handle_create_profile(
    State(state): State<AppState>,
    Json(request): Json<ProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let job_title = request.job_title.trim();
    if job_title.is_empty() {
        return Err(AppError::Validation("jobTitle cannot be empty".to_string()));
    }

    if !request.force_refresh {
        if let Some(entry) = cached_entry(state.cache.as_ref(), job_title).await {
            info!("Serving cached profile for '{}'", job_title);
            return Ok(Json(ProfileResponse {
                entry,
                cached: true,
            }));
        }
    }

    let profile = generate_profile(job_title, state.llm.as_ref(), &state.retry).await?;
    let entry = CacheEntry::new(job_title, profile);

    if let Err(e) = state.cache.put(job_title, entry.clone()).await {
        warn!("Failed to save profile for '{}' to cache: {e}", job_title);
    }

    Ok(Json(ProfileResponse {
        entry,
        cached: false,
    }))
}

/// POST /api/v1/analysis
///
/// Scores resume text against a profile supplied inline or cached under `jobTitle`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    if request.resume_text.trim().is_empty() {
        return Err(AppError::Validation("resumeText cannot be empty".to_string()));
    }

    let profile = match (request.profile, request.job_title.as_deref()) {
        (Some(profile), _) => profile.into_sorted(),
        (None, Some(title)) if !title.trim().is_empty() => {
            cached_entry(state.cache.as_ref(), title)
                .await
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "No cached profile for '{}'. Generate one first.",
                        title.trim()
                    ))
                })?
                .profile
        }
        _ => {
            return Err(AppError::Validation(
                "Provide either a profile or the jobTitle of a cached profile".to_string(),
            ))
        }
    };

    let result = compare_resume_to_profile(
        &request.resume_text,
        &profile,
        state.llm.as_ref(),
        &state.retry,
    )
    .await?;
    let insights = build_insights(&result, &profile);

    Ok(Json(AnalyzeResponse { result, insights }))
}

/// Cache lookup where a failing backend reads as a miss.
async fn cached_entry(cache: &dyn ProfileCache, job_title: &str) -> Option<CacheEntry> {
    cache.get(job_title).await.unwrap_or_else(|e| {
        warn!("Failed to read profile cache for '{}': {e}", job_title.trim());
        None
    })
}
