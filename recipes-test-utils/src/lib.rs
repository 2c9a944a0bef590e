//! Recipes Test Utilities
//!
//! Shared test infrastructure for the recipes workspace:
//! - Proptest generators for drafts, documents and write sequences
//! - Fixtures for common recipes
//! - Store and cache doubles that count calls or inject failures
//! - Assertions over `RecipeResult`

pub use recipes_core::{
    CacheError, Recipe, RecipeDocument, RecipeDraft, RecipeError, RecipeId, RecipeResult,
    StorageError, Timestamp, ValidationError,
};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use recipes_storage::{InMemoryListingCache, InMemoryRecordStore, ListingCache, RecordStore};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for recipe types.

    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use uuid::Uuid;

    /// Generate a random RecipeId.
    pub fn arb_recipe_id() -> impl Strategy<Value = RecipeId> {
        any::<[u8; 16]>().prop_map(|bytes| RecipeId::new(Uuid::from_bytes(bytes)))
    }

    /// Generate a timestamp between 2020 and 2030, whole seconds.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1_577_836_800i64..1_893_456_000i64).prop_map(|secs| {
            Utc.timestamp_opt(secs, 0)
                .single()
                .unwrap_or_else(Utc::now)
        })
    }

    /// Generate a non-blank label.
    pub fn arb_label() -> impl Strategy<Value = String> {
        "[a-zA-Z][a-zA-Z0-9 ,.'-]{0,24}"
    }

    /// Generate a list of labels, possibly empty, duplicates allowed.
    pub fn arb_labels() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(arb_label(), 0..5)
    }

    /// Generate a draft with a non-blank name and labels.
    pub fn arb_draft() -> impl Strategy<Value = RecipeDraft> {
        (arb_label(), arb_labels(), arb_labels(), arb_labels()).prop_map(
            |(name, tags, ingredients, instructions)| RecipeDraft {
                name,
                tags,
                ingredients,
                instructions,
            },
        )
    }

    /// Generate a storable document.
    pub fn arb_document() -> impl Strategy<Value = RecipeDocument> {
        (arb_draft(), arb_timestamp())
            .prop_map(|(draft, published_at)| RecipeDocument::from_draft(draft, published_at))
    }

    /// A write against the record service. `Update` and `Delete` pick a
    /// target by index into the ids created so far, wrapping around; with
    /// no ids yet they target an unknown id.
    #[derive(Debug, Clone)]
    pub enum WriteOp {
        Create(RecipeDraft),
        Update(usize, RecipeDraft),
        Delete(usize),
    }

    /// Generate a single write.
    pub fn arb_write_op() -> impl Strategy<Value = WriteOp> {
        prop_oneof![
            3 => arb_draft().prop_map(WriteOp::Create),
            2 => (any::<usize>(), arb_draft()).prop_map(|(i, d)| WriteOp::Update(i, d)),
            1 => any::<usize>().prop_map(WriteOp::Delete),
        ]
    }

    /// Generate a sequence of writes.
    pub fn arb_write_ops(max_len: usize) -> impl Strategy<Value = Vec<WriteOp>> {
        prop::collection::vec(arb_write_op(), 0..max_len)
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built recipes for common test scenarios.

    use super::*;
    use chrono::Utc;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    pub fn soup_draft() -> RecipeDraft {
        RecipeDraft {
            name: "Soup".to_string(),
            tags: strings(&["veg"]),
            ingredients: strings(&["water", "salt"]),
            instructions: strings(&["boil"]),
        }
    }

    pub fn stew_draft() -> RecipeDraft {
        RecipeDraft {
            name: "Stew".to_string(),
            tags: strings(&["winter", "main"]),
            ingredients: strings(&["beef", "carrot", "onion"]),
            instructions: strings(&["brown the beef", "simmer for two hours"]),
        }
    }

    pub fn toast_draft() -> RecipeDraft {
        RecipeDraft {
            name: "Toast".to_string(),
            tags: Vec::new(),
            ingredients: strings(&["bread"]),
            instructions: strings(&["toast"]),
        }
    }

    /// A document stamped with the current time.
    pub fn document(draft: RecipeDraft) -> RecipeDocument {
        RecipeDocument::from_draft(draft, Utc::now())
    }

    /// An in-memory store and cache, plus type-erased handles to the same
    /// instances.
    pub fn memory_backends() -> (
        InMemoryRecordStore,
        InMemoryListingCache,
        Arc<dyn RecordStore>,
        Arc<dyn ListingCache>,
    ) {
        let store = InMemoryRecordStore::new();
        let cache = InMemoryListingCache::new();
        let store_handle: Arc<dyn RecordStore> = Arc::new(store.clone());
        let cache_handle: Arc<dyn ListingCache> = Arc::new(cache.clone());
        (store, cache, store_handle, cache_handle)
    }
}

// ============================================================================
// STORE AND CACHE DOUBLES
// ============================================================================

/// In-memory record store that counts full scans.
#[derive(Debug, Default, Clone)]
pub struct CountingRecordStore {
    inner: InMemoryRecordStore,
    scans: Arc<AtomicU64>,
}

impl CountingRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `find_all` calls so far.
    pub fn scans(&self) -> u64 {
        self.scans.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &InMemoryRecordStore {
        &self.inner
    }
}

#[async_trait]
impl RecordStore for CountingRecordStore {
    async fn find_all(&self) -> RecipeResult<Vec<Recipe>> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner.find_all().await
    }

    async fn find_by_id(&self, id: RecipeId) -> RecipeResult<Option<Recipe>> {
        self.inner.find_by_id(id).await
    }

    async fn insert_one(&self, document: &RecipeDocument) -> RecipeResult<RecipeId> {
        self.inner.insert_one(document).await
    }

    async fn update_by_id(&self, id: RecipeId, draft: &RecipeDraft) -> RecipeResult<u64> {
        self.inner.update_by_id(id, draft).await
    }

    async fn delete_by_id(&self, id: RecipeId) -> RecipeResult<u64> {
        self.inner.delete_by_id(id).await
    }

    async fn ping(&self) -> RecipeResult<()> {
        self.inner.ping().await
    }
}

/// Record store whose every operation fails with a connection error.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingRecordStore;

impl FailingRecordStore {
    fn error() -> RecipeError {
        StorageError::ConnectionFailed {
            reason: "store offline".to_string(),
        }
        .into()
    }
}

#[async_trait]
impl RecordStore for FailingRecordStore {
    async fn find_all(&self) -> RecipeResult<Vec<Recipe>> {
        Err(Self::error())
    }

    async fn find_by_id(&self, _id: RecipeId) -> RecipeResult<Option<Recipe>> {
        Err(Self::error())
    }

    async fn insert_one(&self, _document: &RecipeDocument) -> RecipeResult<RecipeId> {
        Err(Self::error())
    }

    async fn update_by_id(&self, _id: RecipeId, _draft: &RecipeDraft) -> RecipeResult<u64> {
        Err(Self::error())
    }

    async fn delete_by_id(&self, _id: RecipeId) -> RecipeResult<u64> {
        Err(Self::error())
    }

    async fn ping(&self) -> RecipeResult<()> {
        Err(Self::error())
    }
}

/// In-memory listing cache with switchable failures per operation.
#[derive(Debug, Default, Clone)]
pub struct FailingListingCache {
    inner: InMemoryListingCache,
    fail_get: Arc<AtomicBool>,
    fail_set: Arc<AtomicBool>,
    fail_delete: Arc<AtomicBool>,
}

impl FailingListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, on: bool) {
        self.fail_get.store(on, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail_set.store(on, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, on: bool) {
        self.fail_delete.store(on, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &InMemoryListingCache {
        &self.inner
    }
}

#[async_trait]
impl ListingCache for FailingListingCache {
    async fn get(&self, key: &str) -> RecipeResult<Option<String>> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(CacheError::ReadFailed {
                key: key.to_string(),
                reason: "connection refused".to_string(),
            }
            .into());
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, blob: &str) -> RecipeResult<()> {
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(CacheError::WriteFailed {
                key: key.to_string(),
                reason: "out of memory".to_string(),
            }
            .into());
        }
        self.inner.set(key, blob).await
    }

    async fn delete(&self, key: &str) -> RecipeResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(CacheError::DeleteFailed {
                key: key.to_string(),
                reason: "connection refused".to_string(),
            }
            .into());
        }
        self.inner.delete(key).await
    }

    async fn ping(&self) -> RecipeResult<()> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable {
                reason: "connection refused".to_string(),
            }
            .into());
        }
        self.inner.ping().await
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over recipe results.

    use super::*;

    /// Assert that a RecipeResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &RecipeResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a RecipeResult is a NotFound storage error.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &RecipeResult<T>) {
        match result {
            Err(RecipeError::Storage(StorageError::NotFound { .. })) => {}
            other => panic!("Expected NotFound error, got: {:?}", other),
        }
    }

    /// Assert that a RecipeResult is a malformed-id validation error.
    #[track_caller]
    pub fn assert_malformed_id<T: std::fmt::Debug>(result: &RecipeResult<T>) {
        match result {
            Err(RecipeError::Validation(ValidationError::MalformedId { .. })) => {}
            other => panic!("Expected MalformedId error, got: {:?}", other),
        }
    }

    /// Assert that a RecipeResult is a cache error.
    #[track_caller]
    pub fn assert_cache_error<T: std::fmt::Debug>(result: &RecipeResult<T>) {
        match result {
            Err(RecipeError::Cache(_)) => {}
            other => panic!("Expected Cache error, got: {:?}", other),
        }
    }

    /// Assert that two listings hold the same records, ignoring order.
    #[track_caller]
    pub fn assert_same_records(actual: &[Recipe], expected: &[Recipe]) {
        let mut actual: Vec<&Recipe> = actual.iter().collect();
        let mut expected: Vec<&Recipe> = expected.iter().collect();
        actual.sort_by_key(|r| r.id);
        expected.sort_by_key(|r| r.id);
        assert_eq!(actual, expected, "Listings differ");
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_documents_stamped_in_range(document in arb_document()) {
            prop_assert!(document.published_at.timestamp() >= 1_577_836_800);
            prop_assert!(document.published_at.timestamp() < 1_893_456_000);
            prop_assert!(!document.name.trim().is_empty());
        }
    }

    #[tokio::test]
    async fn test_counting_store_counts_scans() {
        let store = CountingRecordStore::new();
        store.find_all().await.unwrap();
        store.find_all().await.unwrap();
        assert_eq!(store.scans(), 2);
    }

    #[tokio::test]
    async fn test_failing_cache_switches() {
        let cache = FailingListingCache::new();
        cache.set("recipes", "[]").await.unwrap();

        cache.fail_reads(true);
        assert!(cache.get("recipes").await.is_err());
        cache.fail_reads(false);
        assert_eq!(cache.get("recipes").await.unwrap().as_deref(), Some("[]"));
    }
}
