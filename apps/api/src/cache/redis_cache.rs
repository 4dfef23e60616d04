//! Redis-backed profile cache: one hash, field = normalized title, value = entry JSON.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{info, warn};

use super::{normalize_title, CacheEntry, CacheError, ProfileCache};

pub const CACHE_KEY: &str = "atsOptimizerCache";

#[derive(Clone)]
pub struct RedisProfileCache {
    conn: MultiplexedConnection,
}

impl RedisProfileCache {
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis profile cache connected");
        Ok(Self { conn })
    }
}

#[async_trait]
impl ProfileCache for RedisProfileCache {
    async fn get(&self, job_title: &str) -> Result<Option<CacheEntry>, CacheError> {
        let field = normalize_title(job_title);
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.hget(CACHE_KEY, &field).await?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match decode_entry(&field, &raw) {
            Some(entry) => Ok(Some(entry)),
            None => {
                // Corrupt entries are dropped and read as a miss.
                let _: () = conn.hdel(CACHE_KEY, &field).await?;
                Ok(None)
            }
        }
    }

    async fn put(&self, job_title: &str, entry: CacheEntry) -> Result<(), CacheError> {
        let value = serde_json::to_string(&entry)?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .hset(CACHE_KEY, normalize_title(job_title), value)
            .await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<CacheEntry>, CacheError> {
        let mut conn = self.conn.clone();
        let values: Vec<String> = conn.hvals(CACHE_KEY).await?;

        Ok(values
            .iter()
            .filter_map(|raw| decode_entry(CACHE_KEY, raw))
            .collect())
    }
}

/// Parses a stored entry; unreadable JSON is logged and yields `None`.
fn decode_entry(field: &str, raw: &str) -> Option<CacheEntry> {
    match serde_json::from_str(raw) {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!("Discarding unreadable cache entry '{}': {}", field, e);
            None
        }
    }
}
