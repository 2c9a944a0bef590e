//! Recipes Core - Record Types
//!
//! Pure data structures shared by every other crate: the recipe record,
//! its identifier, the client draft, and the error taxonomy.

use chrono::{DateTime, Utc};

pub mod error;
pub mod recipe;

pub use error::{CacheError, RecipeError, RecipeResult, StorageError, ValidationError};
pub use recipe::{Recipe, RecipeDocument, RecipeDraft, RecipeId};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;
