//! Cache-aside policy for the full recipe listing.
//!
//! The listing is the only multi-record read, so it is the only thing
//! cached. It lives as one serialized blob under a single key with no TTL.
//!
//! Reads check the cache first. A miss scans the record store, writes the
//! result back, and returns it. Writes never patch the cached blob; they
//! evict the key so the next read rebuilds it from the store.
//!
//! # Consistency window
//!
//! There is no coordination between requests. A listing read that scanned
//! the store before a write committed can finish its cache write after that
//! write's eviction, leaving pre-write data cached until the next eviction.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use recipes_core::{CacheError, Recipe, RecipeResult};

use super::traits::{CacheStats, ListingCache};
use crate::store::RecordStore;

/// Default key the listing blob is stored under.
pub const DEFAULT_LISTING_KEY: &str = "recipes";

#[derive(Debug, Default)]
struct ListingCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    repopulation_failures: AtomicU64,
    invalidations: AtomicU64,
}

/// Coordinates listing reads and invalidations between the record store
/// and the listing cache.
pub struct CacheAsideListing {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn ListingCache>,
    key: String,
    counters: ListingCounters,
}

impl CacheAsideListing {
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<dyn ListingCache>) -> Self {
        Self::with_key(store, cache, DEFAULT_LISTING_KEY)
    }

    pub fn with_key(
        store: Arc<dyn RecordStore>,
        cache: Arc<dyn ListingCache>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            cache,
            key: key.into(),
            counters: ListingCounters::default(),
        }
    }

    /// The cache key holding the listing.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<dyn ListingCache> {
        &self.cache
    }

    /// Every recipe, from the cache when present, otherwise from the store.
    ///
    /// # Errors
    ///
    /// - Cache read failures other than "absent" are returned as-is; they
    ///   are never treated as a miss.
    /// - A cached blob that does not decode is `CacheError::Corrupted`.
    /// - Store failures on the miss path are returned.
    ///
    /// A failed cache write after a successful store read is logged and
    /// swallowed.
    pub async fn get_listing(&self) -> RecipeResult<Vec<Recipe>> {
        if let Some(blob) = self.cache.get(&self.key).await? {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key = %self.key, "recipes - cache hit");

            let recipes: Vec<Recipe> =
                serde_json::from_str(&blob).map_err(|e| CacheError::Corrupted {
                    key: self.key.clone(),
                    reason: e.to_string(),
                })?;
            return Ok(recipes);
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(key = %self.key, "recipes - cache miss, reading store");

        let recipes = self.store.find_all().await?;
        self.repopulate(&recipes).await;
        Ok(recipes)
    }

    /// Evict the listing so the next read goes to the store.
    ///
    /// Deleting an absent key succeeds. A failure is returned to the caller
    /// but does not undo whatever write preceded it.
    pub async fn invalidate(&self) -> RecipeResult<()> {
        self.cache.delete(&self.key).await?;
        self.counters.invalidations.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(key = %self.key, "recipes - listing invalidated");
        Ok(())
    }

    /// Snapshot of the listing counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            repopulation_failures: self.counters.repopulation_failures.load(Ordering::Relaxed),
            invalidations: self.counters.invalidations.load(Ordering::Relaxed),
        }
    }

    async fn repopulate(&self, recipes: &[Recipe]) {
        let blob = match serde_json::to_string(recipes) {
            Ok(blob) => blob,
            Err(e) => {
                self.record_repopulation_failure(&CacheError::EncodeFailed {
                    reason: e.to_string(),
                });
                return;
            }
        };

        if let Err(e) = self.cache.set(&self.key, &blob).await {
            self.record_repopulation_failure(&e);
        }
    }

    fn record_repopulation_failure(&self, err: &dyn std::fmt::Display) {
        self.counters
            .repopulation_failures
            .fetch_add(1, Ordering::Relaxed);
        tracing::warn!(key = %self.key, error = %err, "Failed to repopulate listing cache");
    }
}
