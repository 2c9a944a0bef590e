//! Recipes API - REST Layer
//!
//! Axum handlers for recipe CRUD over a record store, with the full listing
//! served cache-aside from a key-value cache and evicted on every write.
//!
//! The record store is PostgreSQL (one JSONB document per recipe) and the
//! listing cache is Redis. Both can be swapped for in-process backends.

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod seed;
pub mod services;
pub mod telemetry;

// Re-export commonly used types
pub use config::{ApiConfig, Backend, CacheConfig, SeedConfig};
pub use db::{DbConfig, PgRecordStore};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
pub use services::RecipeService;
