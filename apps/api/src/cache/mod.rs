//! Profile cache: last generated profile per job title.
//!
//! Keys are normalized titles (trimmed, lower-cased); the entry keeps the
//! caller's original casing. Last write wins, there is no history.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::analysis::profile::CandidateProfile;

pub mod redis_cache;

pub use redis_cache::RedisProfileCache;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub job_title: String,
    pub profile: CandidateProfile,
    pub analyzed_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(job_title: &str, profile: CandidateProfile) -> Self {
        Self {
            job_title: job_title.trim().to_string(),
            profile,
            analyzed_at: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Key-value store of profiles. Implementations normalize titles themselves,
/// so callers pass whatever the user typed.
#[async_trait]
pub trait ProfileCache: Send + Sync {
    async fn get(&self, job_title: &str) -> Result<Option<CacheEntry>, CacheError>;
    async fn put(&self, job_title: &str, entry: CacheEntry) -> Result<(), CacheError>;
    async fn list_all(&self) -> Result<Vec<CacheEntry>, CacheError>;
}

/// Cached entries, newest `analyzed_at` first, optionally truncated.
pub async fn list_recent(
    cache: &dyn ProfileCache,
    limit: Option<usize>,
) -> Result<Vec<CacheEntry>, CacheError> {
    let mut entries = cache.list_all().await?;
    entries.sort_by(|a, b| b.analyzed_at.cmp(&a.analyzed_at));
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    Ok(entries)
}

/// Process-local cache. Default backend when no Redis URL is configured.
#[derive(Default)]
pub struct MemoryProfileCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryProfileCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileCache for MemoryProfileCache {
    async fn get(&self, job_title: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self
            .entries
            .read()
            .await
            .get(&normalize_title(job_title))
            .cloned())
    }

    async fn put(&self, job_title: &str, entry: CacheEntry) -> Result<(), CacheError> {
        self.entries
            .write()
            .await
            .insert(normalize_title(job_title), entry);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<CacheEntry>, CacheError> {
        Ok(self.entries.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::analysis::profile::tests::{sample_profile, skill};

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Senior Engineer \n"), "senior engineer");
        assert_eq!(normalize_title("senior engineer"), "senior engineer");
    }

    #[test]
    fn test_entry_trims_title_but_keeps_casing() {
        let entry = CacheEntry::new("  Staff SRE ", sample_profile());
        assert_eq!(entry.job_title, "Staff SRE");
    }

    #[test]
    fn test_entry_serializes_camel_case_iso_timestamp() {
        let entry = CacheEntry::new("Staff SRE", sample_profile());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["jobTitle"], "Staff SRE");
        assert!(json["analyzedAt"].as_str().unwrap().contains('T'));
        let back: CacheEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }

    #[tokio::test]
    async fn test_lookup_ignores_case_and_whitespace() {
        let cache = MemoryProfileCache::new();
        let entry = CacheEntry::new("Senior Engineer", sample_profile());
        cache.put("Senior Engineer", entry.clone()).await.unwrap();

        let a = cache.get("Senior Engineer ").await.unwrap();
        let b = cache.get("senior engineer").await.unwrap();
        assert_eq!(a, Some(entry.clone()));
        assert_eq!(a, b);
        assert!(cache.get("Junior Engineer").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_same_normalized_title() {
        let cache = MemoryProfileCache::new();
        cache
            .put("Data Scientist", CacheEntry::new("Data Scientist", sample_profile()))
            .await
            .unwrap();

        let mut newer = sample_profile();
        newer.keywords = vec![skill("MLOps", 9.0)];
        cache
            .put(" DATA SCIENTIST", CacheEntry::new(" DATA SCIENTIST", newer.clone()))
            .await
            .unwrap();

        let all = cache.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].job_title, "DATA SCIENTIST");
        assert_eq!(all[0].profile, newer);
    }

    #[tokio::test]
    async fn test_list_recent_sorts_newest_first_and_limits() {
        let cache = MemoryProfileCache::new();
        let now = Utc::now();
        for (title, age_days) in [("Old", 10), ("Newest", 0), ("Middle", 3)] {
            let mut entry = CacheEntry::new(title, sample_profile());
            entry.analyzed_at = now - Duration::days(age_days);
            cache.put(title, entry).await.unwrap();
        }

        let titles: Vec<_> = list_recent(&cache, None)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.job_title)
            .collect();
        assert_eq!(titles, vec!["Newest", "Middle", "Old"]);

        assert_eq!(list_recent(&cache, Some(2)).await.unwrap().len(), 2);
    }
}
