//! Database Connection Pool Module
//!
//! PostgreSQL connection pooling using deadpool-postgres, and the
//! `PgRecordStore` that keeps each recipe as a JSONB document keyed by its
//! UUID.
//!
//! Schema:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS recipes (
//!     id       UUID PRIMARY KEY,
//!     document JSONB NOT NULL
//! );
//! ```

use std::time::Duration;

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolError, RecyclingMethod, Runtime};
use recipes_core::{
    Recipe, RecipeDocument, RecipeDraft, RecipeId, RecipeResult, StorageError,
};
use recipes_storage::RecordStore;
use serde_json::Value as JsonValue;
use tokio_postgres::{NoTls, Row};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

const CREATE_TABLE_SQL: &str =
    "CREATE TABLE IF NOT EXISTS recipes (id UUID PRIMARY KEY, document JSONB NOT NULL)";
const SELECT_ALL_SQL: &str = "SELECT id, document FROM recipes ORDER BY id";
const SELECT_ONE_SQL: &str = "SELECT id, document FROM recipes WHERE id = $1";
const INSERT_SQL: &str = "INSERT INTO recipes (id, document) VALUES ($1, $2)";
const UPDATE_SQL: &str = "UPDATE recipes SET document = document || $2::jsonb WHERE id = $1";
const DELETE_SQL: &str = "DELETE FROM recipes WHERE id = $1";

// ============================================================================
// CONNECTION POOL CONFIGURATION
// ============================================================================

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL host
    pub host: String,
    /// PostgreSQL port
    pub port: u16,
    /// Database name
    pub dbname: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Maximum pool size
    pub max_size: usize,
    /// Connection timeout
    pub timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            dbname: "recipes".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("RECIPES_DB_HOST").unwrap_or(defaults.host),
            port: lookup("RECIPES_DB_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            dbname: lookup("RECIPES_DB_NAME").unwrap_or(defaults.dbname),
            user: lookup("RECIPES_DB_USER").unwrap_or(defaults.user),
            password: lookup("RECIPES_DB_PASSWORD").unwrap_or_default(),
            max_size: lookup("RECIPES_DB_POOL_SIZE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_size),
            timeout: lookup("RECIPES_DB_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    /// Create a connection pool from this configuration.
    pub fn create_pool(&self) -> ApiResult<Pool> {
        let mut cfg = Config::new();
        cfg.host = Some(self.host.clone());
        cfg.port = Some(self.port);
        cfg.dbname = Some(self.dbname.clone());
        cfg.user = Some(self.user.clone());
        cfg.password = Some(self.password.clone());
        cfg.connect_timeout = Some(self.timeout);

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        cfg.pool = Some(deadpool_postgres::PoolConfig::new(self.max_size));

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// RECORD STORE
// ============================================================================

/// Record store backed by a PostgreSQL JSONB table.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: Pool,
}

impl PgRecordStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a store from configuration. No connection is opened yet.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Get the current pool size for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Create the recipes table if it does not exist yet.
    pub async fn ensure_schema(&self) -> RecipeResult<()> {
        let conn = self.get_conn().await?;
        conn.batch_execute(CREATE_TABLE_SQL)
            .await
            .map_err(query_failed)?;
        Ok(())
    }

    async fn get_conn(&self) -> RecipeResult<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| pool_error(e).into())
    }
}

fn pool_error(err: PoolError) -> StorageError {
    StorageError::ConnectionFailed {
        reason: err.to_string(),
    }
}

fn query_failed(err: tokio_postgres::Error) -> StorageError {
    StorageError::QueryFailed {
        reason: err.to_string(),
    }
}

fn encode_document(document: &RecipeDocument) -> Result<JsonValue, StorageError> {
    serde_json::to_value(document).map_err(|e| StorageError::InsertFailed {
        reason: e.to_string(),
    })
}

/// The JSONB patch an update merges into the stored document.
///
/// Only the draft fields are present, so `publishedAt` survives the merge.
fn update_patch(draft: &RecipeDraft) -> JsonValue {
    serde_json::json!({
        "name": draft.name,
        "tags": draft.tags,
        "ingredients": draft.ingredients,
        "instructions": draft.instructions,
    })
}

fn decode_document(id: Uuid, document: JsonValue) -> Result<Recipe, String> {
    let document: RecipeDocument = serde_json::from_value(document)
        .map_err(|e| format!("recipe {}: {}", id, e))?;
    Ok(Recipe::from_document(RecipeId::new(id), document))
}

fn decode_row(row: &Row) -> Result<Recipe, String> {
    let id: Uuid = row.try_get(0).map_err(|e| e.to_string())?;
    let document: JsonValue = row.try_get(1).map_err(|e| e.to_string())?;
    decode_document(id, document)
}

/// Keep the records that decoded, in order. The rest are logged and dropped.
fn keep_decodable(decoded: impl IntoIterator<Item = Result<Recipe, String>>) -> Vec<Recipe> {
    decoded
        .into_iter()
        .filter_map(|result| match result {
            Ok(recipe) => Some(recipe),
            Err(reason) => {
                tracing::warn!(error = %reason, "cannot decode recipe, skipping");
                None
            }
        })
        .collect()
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn find_all(&self) -> RecipeResult<Vec<Recipe>> {
        let conn = self.get_conn().await?;
        let rows = conn.query(SELECT_ALL_SQL, &[]).await.map_err(query_failed)?;
        Ok(keep_decodable(rows.iter().map(decode_row)))
    }

    async fn find_by_id(&self, id: RecipeId) -> RecipeResult<Option<Recipe>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(SELECT_ONE_SQL, &[&id.as_uuid()])
            .await
            .map_err(query_failed)?;

        match row {
            Some(row) => decode_row(&row)
                .map(Some)
                .map_err(|reason| StorageError::QueryFailed { reason }.into()),
            None => Ok(None),
        }
    }

    async fn insert_one(&self, document: &RecipeDocument) -> RecipeResult<RecipeId> {
        let body = encode_document(document)?;
        let id = RecipeId::now_v7();

        let conn = self.get_conn().await?;
        conn.execute(INSERT_SQL, &[&id.as_uuid(), &body])
            .await
            .map_err(|e| StorageError::InsertFailed {
                reason: e.to_string(),
            })?;

        Ok(id)
    }

    async fn insert_many(&self, documents: &[RecipeDocument]) -> RecipeResult<Vec<RecipeId>> {
        let bodies = documents
            .iter()
            .map(encode_document)
            .collect::<Result<Vec<_>, _>>()?;

        let mut conn = self.get_conn().await?;
        let tx = conn.transaction().await.map_err(query_failed)?;
        let stmt = tx.prepare(INSERT_SQL).await.map_err(query_failed)?;

        let mut ids = Vec::with_capacity(bodies.len());
        for body in &bodies {
            let id = RecipeId::now_v7();
            tx.execute(&stmt, &[&id.as_uuid(), body])
                .await
                .map_err(|e| StorageError::InsertFailed {
                    reason: e.to_string(),
                })?;
            ids.push(id);
        }

        tx.commit().await.map_err(|e| StorageError::InsertFailed {
            reason: e.to_string(),
        })?;
        Ok(ids)
    }

    async fn update_by_id(&self, id: RecipeId, draft: &RecipeDraft) -> RecipeResult<u64> {
        let patch = update_patch(draft);

        let conn = self.get_conn().await?;
        let matched = conn
            .execute(UPDATE_SQL, &[&id.as_uuid(), &patch])
            .await
            .map_err(|e| StorageError::UpdateFailed {
                id,
                reason: e.to_string(),
            })?;
        Ok(matched)
    }

    async fn delete_by_id(&self, id: RecipeId) -> RecipeResult<u64> {
        let conn = self.get_conn().await?;
        let matched = conn
            .execute(DELETE_SQL, &[&id.as_uuid()])
            .await
            .map_err(|e| StorageError::DeleteFailed {
                id,
                reason: e.to_string(),
            })?;
        Ok(matched)
    }

    async fn ping(&self) -> RecipeResult<()> {
        let conn = self.get_conn().await?;
        conn.simple_query("SELECT 1").await.map_err(|e| StorageError::ConnectionFailed {
            reason: e.to_string(),
        })?;
        Ok(())
    }
}
