//! Recipe Service
//!
//! The record operations behind the HTTP handlers. Every mutation commits
//! to the record store first and then evicts the cached listing. A failed
//! eviction is reported to the caller but the committed write stays.

use std::sync::Arc;

use chrono::Utc;
use recipes_core::{
    Recipe, RecipeDocument, RecipeDraft, RecipeId, RecipeResult, StorageError,
};
use recipes_storage::{CacheAsideListing, CacheStats, ListingCache, RecordStore};

/// Recipe operations over a shared record store and listing cache.
pub struct RecipeService {
    store: Arc<dyn RecordStore>,
    listing: CacheAsideListing,
}

impl RecipeService {
    /// Build a service using the default listing key.
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<dyn ListingCache>) -> Self {
        Self::from_listing(CacheAsideListing::new(store, cache))
    }

    /// Build a service around an existing listing policy, sharing its store.
    pub fn from_listing(listing: CacheAsideListing) -> Self {
        Self {
            store: Arc::clone(listing.store()),
            listing,
        }
    }

    pub fn listing(&self) -> &CacheAsideListing {
        &self.listing
    }

    /// Every recipe, through the listing cache.
    pub async fn list(&self) -> RecipeResult<Vec<Recipe>> {
        self.listing.get_listing().await
    }

    /// A single recipe.
    ///
    /// A malformed id is a validation error, distinct from `NotFound`.
    /// Reads never touch the listing cache.
    pub async fn get(&self, raw_id: &str) -> RecipeResult<Recipe> {
        let id = RecipeId::parse(raw_id)?;
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| StorageError::NotFound { id }.into())
    }

    /// Persist a new recipe stamped with the current time.
    ///
    /// The draft is stored as sent; empty names and blank entries included.
    pub async fn create(&self, draft: RecipeDraft) -> RecipeResult<Recipe> {
        let document = RecipeDocument::from_draft(draft, Utc::now());
        let id = self.store.insert_one(&document).await?;
        tracing::info!(recipe_id = %id, "Recipe created");

        self.listing.invalidate().await?;
        Ok(Recipe::from_document(id, document))
    }

    /// Replace the mutable fields of a recipe.
    ///
    /// An id that matches nothing is not an error and creates nothing.
    pub async fn update(&self, raw_id: &str, draft: RecipeDraft) -> RecipeResult<()> {
        let id = RecipeId::parse(raw_id)?;

        let matched = self.store.update_by_id(id, &draft).await?;
        tracing::info!(recipe_id = %id, matched, "Recipe updated");

        self.listing.invalidate().await
    }

    /// Remove a recipe. Removing an unknown id is not an error.
    pub async fn delete(&self, raw_id: &str) -> RecipeResult<()> {
        let id = RecipeId::parse(raw_id)?;

        let matched = self.store.delete_by_id(id).await?;
        tracing::info!(recipe_id = %id, matched, "Recipe deleted");

        self.listing.invalidate().await
    }

    /// Insert documents in one batch and evict the listing.
    ///
    /// Returns how many records were inserted.
    pub async fn bulk_load(&self, documents: Vec<RecipeDocument>) -> RecipeResult<usize> {
        let ids = self.store.insert_many(&documents).await?;
        self.listing.invalidate().await?;
        Ok(ids.len())
    }

    pub async fn ping_store(&self) -> RecipeResult<()> {
        self.store.ping().await
    }

    pub async fn ping_cache(&self) -> RecipeResult<()> {
        self.listing.cache().ping().await
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.listing.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipes_storage::{InMemoryListingCache, InMemoryRecordStore, DEFAULT_LISTING_KEY};
    use recipes_test_utils::assertions::{
        assert_cache_error, assert_malformed_id, assert_not_found, assert_ok,
    };
    use recipes_test_utils::fixtures::{memory_backends, soup_draft as soup, toast_draft};
    use recipes_test_utils::FailingListingCache;

    fn service() -> (RecipeService, InMemoryRecordStore, InMemoryListingCache) {
        let (store, cache, store_handle, cache_handle) = memory_backends();
        (RecipeService::new(store_handle, cache_handle), store, cache)
    }

    #[tokio::test]
    async fn test_create_then_get_roundtrip() {
        let (service, _store, _cache) = service();
        let before = Utc::now();

        let created = service.create(soup()).await.unwrap();
        let fetched = service.get(&created.id.to_string()).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "Soup");
        assert_eq!(fetched.ingredients, vec!["water", "salt"]);
        assert!(fetched.published_at >= before);
        assert!(fetched.published_at <= Utc::now());
    }

    #[tokio::test]
    async fn test_create_invalidates_listing() {
        let (service, _store, cache) = service();
        assert!(service.list().await.unwrap().is_empty());
        assert!(cache.contains(DEFAULT_LISTING_KEY));

        service.create(soup()).await.unwrap();
        assert!(!cache.contains(DEFAULT_LISTING_KEY));
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_stores_draft_as_sent() {
        let (service, store, _cache) = service();

        let created = service.create(RecipeDraft::default()).await.unwrap();
        assert_eq!(created.name, "");
        assert!(created.tags.is_empty());

        let blank_tags = RecipeDraft {
            tags: vec!["".to_string(), "veg".to_string(), "veg".to_string()],
            ..toast_draft()
        };
        let created = service.create(blank_tags.clone()).await.unwrap();
        assert_eq!(created.tags, blank_tags.tags);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_get_malformed_id_is_invalid_input_not_not_found() {
        let (service, _store, _cache) = service();
        let result = service.get("not-a-valid-id-format").await;

        assert_malformed_id(&result);
        assert!(result.is_err_and(|e| e.is_invalid_input() && !e.is_not_found()));
    }

    #[tokio::test]
    async fn test_get_unknown_id_is_not_found() {
        let (service, _store, _cache) = service();
        assert_not_found(&service.get(&RecipeId::now_v7().to_string()).await);
    }

    #[tokio::test]
    async fn test_create_reports_invalidation_failure_after_writing() {
        let (store, _cache, store_handle, _) = memory_backends();
        let cache = FailingListingCache::new();
        cache.fail_deletes(true);
        let service = RecipeService::new(store_handle, Arc::new(cache));

        assert_cache_error(&service.create(soup()).await);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_published_at_and_invalidates() {
        let (service, _store, cache) = service();
        let created = service.create(soup()).await.unwrap();
        service.list().await.unwrap();

        service
            .update(
                &created.id.to_string(),
                RecipeDraft {
                    name: "Stew".to_string(),
                    ..soup()
                },
            )
            .await
            .unwrap();

        assert!(!cache.contains(DEFAULT_LISTING_KEY));
        let updated = service.get(&created.id.to_string()).await.unwrap();
        assert_eq!(updated.name, "Stew");
        assert_eq!(updated.published_at, created.published_at);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_silent_and_creates_nothing() {
        let (service, store, cache) = service();
        service.list().await.unwrap();

        service
            .update(&RecipeId::now_v7().to_string(), soup())
            .await
            .unwrap();

        assert!(store.is_empty());
        assert!(!cache.contains(DEFAULT_LISTING_KEY));
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_silent() {
        let (service, _store, _cache) = service();
        assert_ok(&service.delete(&RecipeId::now_v7().to_string()).await);
        assert_malformed_id(&service.delete("42").await);
    }

    #[tokio::test]
    async fn test_delete_removes_from_listing() {
        let (service, _store, _cache) = service();
        let created = service.create(soup()).await.unwrap();
        assert_eq!(service.list().await.unwrap().len(), 1);

        service.delete(&created.id.to_string()).await.unwrap();
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_load_counts_and_invalidates() {
        let (service, _store, cache) = service();
        service.list().await.unwrap();

        let documents = vec![
            RecipeDocument::from_draft(soup(), Utc::now()),
            RecipeDocument::from_draft(soup(), Utc::now()),
        ];
        assert_eq!(service.bulk_load(documents).await.unwrap(), 2);
        assert!(!cache.contains(DEFAULT_LISTING_KEY));
        assert_eq!(service.list().await.unwrap().len(), 2);
    }
}
