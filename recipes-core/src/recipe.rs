//! The recipe record, its identifier, and the client-supplied draft.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::Timestamp;

// ============================================================================
// IDENTITY
// ============================================================================

/// Opaque recipe identifier.
///
/// Backed by a UUIDv7 so identifiers sort by creation time. Assigned by the
/// record store on insert and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(Uuid);

impl RecipeId {
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a fresh, timestamp-sortable identifier.
    pub fn now_v7() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Parse a client-supplied identifier.
    ///
    /// Anything that is not a UUID, surrounding whitespace included, is
    /// rejected as malformed. Callers must keep that distinct from
    /// "well-formed but unknown".
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| ValidationError::MalformedId {
                value: value.to_string(),
            })
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for RecipeId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for RecipeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

// ============================================================================
// RECORD
// ============================================================================

/// A stored recipe.
///
/// `id` and `published_at` are fixed at creation; every other field is
/// replaced wholesale by an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub published_at: Timestamp,
}

impl Recipe {
    /// Build a new record from a draft. The draft is taken as given.
    pub fn from_draft(id: RecipeId, draft: RecipeDraft, published_at: Timestamp) -> Self {
        Self::from_document(id, RecipeDocument::from_draft(draft, published_at))
    }

    pub fn from_document(id: RecipeId, document: RecipeDocument) -> Self {
        Self {
            id,
            name: document.name,
            tags: document.tags,
            ingredients: document.ingredients,
            instructions: document.instructions,
            published_at: document.published_at,
        }
    }

    /// Replace the mutable fields with the draft's, keeping `id` and
    /// `published_at`.
    pub fn apply_draft(&mut self, draft: RecipeDraft) {
        self.name = draft.name;
        self.tags = draft.tags;
        self.ingredients = draft.ingredients;
        self.instructions = draft.instructions;
    }
}

/// The persisted body of a recipe: everything except its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDocument {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub instructions: Vec<String>,
    pub published_at: Timestamp,
}

impl RecipeDocument {
    pub fn from_draft(draft: RecipeDraft, published_at: Timestamp) -> Self {
        Self {
            name: draft.name,
            tags: draft.tags,
            ingredients: draft.ingredients,
            instructions: draft.instructions,
            published_at,
        }
    }
}

// ============================================================================
// DRAFT
// ============================================================================

/// Client-supplied body for create and update.
///
/// Every field may be left out or sent as `null`, and then reads as empty.
/// Entries are stored as sent: blanks, duplicates and order included. Only
/// a body that is not JSON, or has a field of the wrong type, is refused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDraft {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub instructions: Vec<String>,
}

/// Read an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
