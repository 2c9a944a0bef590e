//! Listing cache backend trait and statistics.

use async_trait::async_trait;
use recipes_core::RecipeResult;

/// Key-value cache holding serialized listings.
///
/// Backends store opaque string blobs with no expiration. An absent key is
/// reported as `Ok(None)`; only genuine backend failures are errors, so the
/// caller can tell a miss apart from an outage.
#[async_trait]
pub trait ListingCache: Send + Sync {
    /// Read the blob stored under `key`.
    async fn get(&self, key: &str) -> RecipeResult<Option<String>>;

    /// Store `blob` under `key`, replacing any previous value. No TTL.
    async fn set(&self, key: &str, blob: &str) -> RecipeResult<()>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> RecipeResult<()>;

    /// Connectivity probe.
    async fn ping(&self) -> RecipeResult<()>;
}

/// Statistics about listing cache usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    /// Listing reads answered from the cache.
    pub hits: u64,
    /// Listing reads that went to the record store.
    pub misses: u64,
    /// Cache writes after a miss that failed and were ignored.
    pub repopulation_failures: u64,
    /// Successful invalidations.
    pub invalidations: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty_stats = CacheStats::default();
        assert!((empty_stats.hit_rate() - 0.0).abs() < 0.001);
    }
}
