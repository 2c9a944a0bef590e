//! Error types for recipe operations

use thiserror::Error;

use crate::RecipeId;

/// Record store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Recipe not found: {id}")]
    NotFound { id: RecipeId },

    #[error("Connection failed: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Query failed: {reason}")]
    QueryFailed { reason: String },

    #[error("Insert failed: {reason}")]
    InsertFailed { reason: String },

    #[error("Update failed for recipe {id}: {reason}")]
    UpdateFailed { id: RecipeId, reason: String },

    #[error("Delete failed for recipe {id}: {reason}")]
    DeleteFailed { id: RecipeId, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Listing cache errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Cache read failed for key {key}: {reason}")]
    ReadFailed { key: String, reason: String },

    #[error("Cache write failed for key {key}: {reason}")]
    WriteFailed { key: String, reason: String },

    #[error("Cache delete failed for key {key}: {reason}")]
    DeleteFailed { key: String, reason: String },

    #[error("Cached listing under {key} could not be decoded: {reason}")]
    Corrupted { key: String, reason: String },

    #[error("Listing could not be encoded: {reason}")]
    EncodeFailed { reason: String },

    #[error("Cache lock poisoned")]
    LockPoisoned,
}

/// Input validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Malformed recipe id '{value}'")]
    MalformedId { value: String },
}

/// Master error type for all recipe errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecipeError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl RecipeError {
    /// True when the error is the caller's fault.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, RecipeError::Validation(_))
    }

    /// True when the error means "no record with that id".
    pub fn is_not_found(&self) -> bool {
        matches!(self, RecipeError::Storage(StorageError::NotFound { .. }))
    }
}

/// Result type alias for recipe operations.
pub type RecipeResult<T> = Result<T, RecipeError>;

// =============================================================================
// TESTS
// =============================================================================
