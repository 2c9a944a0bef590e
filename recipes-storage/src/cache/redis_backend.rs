//! Redis-backed listing cache.
//!
//! Uses a single multiplexed `ConnectionManager`, cloned per call. The
//! manager reconnects on its own; this module adds no retries or timeouts
//! of its own.
//!
//! Commands used: `GET`, `SET` (no `EX`), `DEL`, `PING`. A nil reply to
//! `GET` is a miss, never an error.

use async_trait::async_trait;
use recipes_core::{CacheError, RecipeResult};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use super::traits::ListingCache;

/// Listing cache stored in Redis.
#[derive(Clone)]
pub struct RedisListingCache {
    conn: ConnectionManager,
}

impl RedisListingCache {
    /// Open a connection manager for `redis_url` (e.g. `redis://localhost:6379/0`).
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Unavailable` if the URL is invalid or the first
    /// connection cannot be established.
    pub async fn connect(redis_url: &str) -> RecipeResult<Self> {
        let client = Client::open(redis_url).map_err(|e| CacheError::Unavailable {
            reason: format!("invalid redis url {}: {}", redis_url, e),
        })?;

        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| CacheError::Unavailable {
                reason: e.to_string(),
            })?;

        Ok(Self::new(conn))
    }

    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ListingCache for RedisListingCache {
    async fn get(&self, key: &str) -> RecipeResult<Option<String>> {
        let mut conn = self.conn.clone();
        let blob: Option<String> = conn.get(key).await.map_err(|e| CacheError::ReadFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        Ok(blob)
    }

    async fn set(&self, key: &str, blob: &str) -> RecipeResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set(key, blob)
            .await
            .map_err(|e| CacheError::WriteFailed {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> RecipeResult<()> {
        let mut conn = self.conn.clone();
        let _removed: u64 = conn.del(key).await.map_err(|e| CacheError::DeleteFailed {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    async fn ping(&self) -> RecipeResult<()> {
        let mut conn = self.conn.clone();
        let _pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Unavailable {
                reason: e.to_string(),
            })?;
        Ok(())
    }
}
