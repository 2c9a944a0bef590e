//! In-process listing cache.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use recipes_core::{CacheError, RecipeResult};

use super::traits::ListingCache;

/// Listing cache backed by a `HashMap`, for tests and single-process runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryListingCache {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a blob is currently stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .map(|entries| entries.contains_key(key))
            .unwrap_or(false)
    }

    /// The raw blob under `key`, bypassing the trait.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }
}

#[async_trait]
impl ListingCache for InMemoryListingCache {
    async fn get(&self, key: &str) -> RecipeResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, blob: &str) -> RecipeResult<()> {
        let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
        entries.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> RecipeResult<()> {
        let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
        entries.remove(key);
        Ok(())
    }

    async fn ping(&self) -> RecipeResult<()> {
        self.entries
            .read()
            .map(|_| ())
            .map_err(|_| CacheError::LockPoisoned.into())
    }
}
