//! Record store abstraction and in-memory implementation.
//!
//! The record store is the source of truth. It assigns identifiers on
//! insert and reports match counts, not errors, for updates and deletes
//! that hit nothing.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use recipes_core::{
    Recipe, RecipeDocument, RecipeDraft, RecipeId, RecipeResult, StorageError,
};

/// Async record store for recipes.
///
/// Implementations must be safe to share across concurrent requests; the
/// service holds a single handle for the life of the process.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every record, in whatever order the store yields them.
    ///
    /// Records that cannot be decoded are logged and skipped rather than
    /// failing the whole listing.
    async fn find_all(&self) -> RecipeResult<Vec<Recipe>>;

    /// A single record, or `None` if no record has that id.
    async fn find_by_id(&self, id: RecipeId) -> RecipeResult<Option<Recipe>>;

    /// Persist a new record and return the identifier the store assigned.
    async fn insert_one(&self, document: &RecipeDocument) -> RecipeResult<RecipeId>;

    /// Persist several records at once.
    async fn insert_many(&self, documents: &[RecipeDocument]) -> RecipeResult<Vec<RecipeId>> {
        let mut ids = Vec::with_capacity(documents.len());
        for document in documents {
            ids.push(self.insert_one(document).await?);
        }
        Ok(ids)
    }

    /// Replace name, tags, ingredients and instructions of the record.
    ///
    /// Returns how many records matched; zero is not an error.
    async fn update_by_id(&self, id: RecipeId, draft: &RecipeDraft) -> RecipeResult<u64>;

    /// Remove the record. Returns how many records matched.
    async fn delete_by_id(&self, id: RecipeId) -> RecipeResult<u64>;

    /// Connectivity probe.
    async fn ping(&self) -> RecipeResult<()>;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// Record store held in process memory.
///
/// Records are kept ordered by id, and ids are UUIDv7, so `find_all`
/// yields insertion order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<BTreeMap<RecipeId, Recipe>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn find_all(&self) -> RecipeResult<Vec<Recipe>> {
        let records = self.records.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(records.values().cloned().collect())
    }

    async fn find_by_id(&self, id: RecipeId) -> RecipeResult<Option<Recipe>> {
        let records = self.records.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(records.get(&id).cloned())
    }

    async fn insert_one(&self, document: &RecipeDocument) -> RecipeResult<RecipeId> {
        let mut records = self.records.write().map_err(|_| StorageError::LockPoisoned)?;
        let mut id = RecipeId::now_v7();
        while records.contains_key(&id) {
            id = RecipeId::now_v7();
        }
        records.insert(id, Recipe::from_document(id, document.clone()));
        Ok(id)
    }

    async fn update_by_id(&self, id: RecipeId, draft: &RecipeDraft) -> RecipeResult<u64> {
        let mut records = self.records.write().map_err(|_| StorageError::LockPoisoned)?;
        match records.get_mut(&id) {
            Some(recipe) => {
                recipe.apply_draft(draft.clone());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_by_id(&self, id: RecipeId) -> RecipeResult<u64> {
        let mut records = self.records.write().map_err(|_| StorageError::LockPoisoned)?;
        Ok(records.remove(&id).map_or(0, |_| 1))
    }

    async fn ping(&self) -> RecipeResult<()> {
        self.records
            .read()
            .map(|_| ())
            .map_err(|_| StorageError::LockPoisoned.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn document(name: &str) -> RecipeDocument {
        RecipeDocument {
            name: name.to_string(),
            tags: vec!["quick".to_string()],
            ingredients: vec!["bread".to_string()],
            instructions: vec!["toast".to_string()],
            published_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_distinct_ids() {
        let store = InMemoryRecordStore::new();
        let first = store.insert_one(&document("Toast")).await.unwrap();
        let second = store.insert_one(&document("Toast")).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_find_all_yields_insertion_order() {
        let store = InMemoryRecordStore::new();
        let ids = store
            .insert_many(&[document("A"), document("B"), document("C")])
            .await
            .unwrap();

        let listed: Vec<RecipeId> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn test_update_preserves_published_at() {
        let store = InMemoryRecordStore::new();
        let original = document("Toast");
        let id = store.insert_one(&original).await.unwrap();

        let draft = RecipeDraft {
            name: "French Toast".to_string(),
            tags: vec![],
            ingredients: vec!["bread".to_string(), "egg".to_string()],
            instructions: vec!["dip".to_string(), "fry".to_string()],
        };
        assert_eq!(store.update_by_id(id, &draft).await.unwrap(), 1);

        let updated = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(updated.name, "French Toast");
        assert_eq!(updated.published_at, original.published_at);
        assert_eq!(updated.id, id);
    }

    #[tokio::test]
    async fn test_missing_ids_match_nothing() {
        let store = InMemoryRecordStore::new();
        let ghost = RecipeId::now_v7();

        assert_eq!(store.find_by_id(ghost).await.unwrap(), None);
        assert_eq!(store.update_by_id(ghost, &RecipeDraft::default()).await.unwrap(), 0);
        assert_eq!(store.delete_by_id(ghost).await.unwrap(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let store = InMemoryRecordStore::new();
        let id = store.insert_one(&document("Toast")).await.unwrap();

        assert_eq!(store.delete_by_id(id).await.unwrap(), 1);
        assert_eq!(store.delete_by_id(id).await.unwrap(), 0);
        assert!(store.find_all().await.unwrap().is_empty());
    }
}
