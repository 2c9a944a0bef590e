//! Demo-data seeding.
//!
//! The seed file is a JSON array of recipes in the same shape the API
//! returns. `id` is ignored, since the store assigns identifiers, and a
//! missing `publishedAt` becomes the load time. Entries are read the same
//! way as a create request body. Any failure aborts startup.

use std::path::Path;

use chrono::Utc;
use recipes_core::{RecipeDocument, RecipeDraft, Timestamp};
use serde::Deserialize;

use crate::config::SeedConfig;
use crate::error::{ApiError, ApiResult};
use crate::services::RecipeService;

/// One entry of the seed file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedRecipe {
    #[serde(flatten)]
    pub draft: RecipeDraft,
    #[serde(default)]
    pub published_at: Option<Timestamp>,
}

/// Decode seed entries into storable documents.
///
/// Entries are decoded one at a time so a bad one is reported by position.
pub fn parse_seed(json: &str, loaded_at: Timestamp) -> ApiResult<Vec<RecipeDocument>> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(json)
        .map_err(|e| ApiError::invalid_input(format!("Invalid seed file: {}", e)))?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let entry: SeedRecipe = serde_json::from_value(entry).map_err(|e| {
                ApiError::invalid_input(format!("Invalid seed entry: {}", e))
                    .with_details(serde_json::json!({ "entry": index }))
            })?;
            let published_at = entry.published_at.unwrap_or(loaded_at);
            Ok(RecipeDocument::from_draft(entry.draft, published_at))
        })
        .collect()
}

/// Read and parse the seed file at `path`.
pub async fn load_seed_file(path: &Path) -> ApiResult<Vec<RecipeDocument>> {
    let json = tokio::fs::read_to_string(path).await.map_err(|e| {
        ApiError::internal_error(format!(
            "Failed to read seed file {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_seed(&json, Utc::now())
}

/// Load the seed file into the store when seeding is enabled.
///
/// Returns the number of inserted recipes, zero when disabled.
pub async fn seed_if_enabled(service: &RecipeService, config: &SeedConfig) -> ApiResult<usize> {
    if !config.enabled {
        return Ok(0);
    }

    let documents = load_seed_file(&config.path).await?;
    let inserted = service.bulk_load(documents).await?;
    tracing::info!(count = inserted, path = %config.path.display(), "Inserted recipes count");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::TimeZone;

    #[test]
    fn test_parse_seed_keeps_given_published_at() {
        let loaded_at = Utc::now();
        let documents = parse_seed(
            r#"[
                {"id": "ignored", "name": "Pancakes", "tags": ["breakfast"],
                 "ingredients": ["flour", "milk"], "instructions": ["mix", "fry"],
                 "publishedAt": "2021-01-17T19:28:52.803062Z"},
                {"name": "Toast"}
            ]"#,
            loaded_at,
        )
        .unwrap();

        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].name, "Pancakes");
        assert_eq!(documents[0].ingredients, vec!["flour", "milk"]);
        assert_eq!(
            documents[0].published_at,
            Utc.with_ymd_and_hms(2021, 1, 17, 19, 28, 52).unwrap()
                + chrono::Duration::microseconds(803062)
        );
        assert_eq!(documents[1].published_at, loaded_at);
        assert!(documents[1].tags.is_empty());
    }

    #[test]
    fn test_parse_seed_reports_bad_entry_position() {
        let err = parse_seed(r#"[{"name": "Soup"}, {"name": 7}]"#, Utc::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(err.details, Some(serde_json::json!({ "entry": 1 })));
    }

    #[test]
    fn test_parse_seed_accepts_null_and_blank_entries() {
        let documents = parse_seed(
            r#"[{"name": "", "tags": null, "ingredients": ["", "salt"]}]"#,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(documents[0].name, "");
        assert!(documents[0].tags.is_empty());
        assert_eq!(documents[0].ingredients, vec!["", "salt"]);
    }

    #[test]
    fn test_parse_seed_rejects_non_array() {
        let err = parse_seed(r#"{"name": "Soup"}"#, Utc::now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_missing_seed_file_fails() {
        let err = load_seed_file(Path::new("does/not/exist.json"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn test_bundled_seed_file_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/init_recipes.json");
        let documents = load_seed_file(&path).await.unwrap();
        assert!(!documents.is_empty());
    }
}
