//! Recipes API Server Entry Point
//!
//! Connects the record store and listing cache, optionally seeds demo
//! data, and serves the Axum router until Ctrl-C.

use std::sync::Arc;

use recipes_api::seed::seed_if_enabled;
use recipes_api::telemetry::{init_tracer, TelemetryConfig};
use recipes_api::{
    create_api_router, ApiConfig, ApiError, ApiResult, Backend, CacheConfig, DbConfig,
    PgRecordStore, RecipeService, SeedConfig,
};
use recipes_storage::{
    CacheAsideListing, InMemoryListingCache, InMemoryRecordStore, ListingCache,
    RecordStore, RedisListingCache,
};

#[tokio::main]
async fn main() -> ApiResult<()> {
    init_tracer(&TelemetryConfig::from_env())?;

    let api_config = ApiConfig::from_env();
    let cache_config = CacheConfig::from_env();
    let seed_config = SeedConfig::from_env();

    let (store, cache) = connect_backends(api_config.backend, &cache_config).await?;
    let listing = CacheAsideListing::with_key(store, cache, cache_config.listing_key.clone());
    let service = Arc::new(RecipeService::from_listing(listing));

    seed_if_enabled(&service, &seed_config).await?;

    let app = create_api_router(service, &api_config);

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, "Starting recipes API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Open the record store and listing cache. Either one failing its first
/// ping aborts startup.
async fn connect_backends(
    backend: Backend,
    cache_config: &CacheConfig,
) -> ApiResult<(Arc<dyn RecordStore>, Arc<dyn ListingCache>)> {
    match backend {
        Backend::Memory => {
            tracing::warn!("Using in-memory store and cache; data is lost on exit");
            Ok((
                Arc::new(InMemoryRecordStore::new()),
                Arc::new(InMemoryListingCache::new()),
            ))
        }
        Backend::Postgres => {
            let db_config = DbConfig::from_env();
            let store = PgRecordStore::from_config(&db_config)?;
            store.ping().await?;
            store.ensure_schema().await?;
            tracing::info!(host = %db_config.host, dbname = %db_config.dbname, "Connected to database");

            let cache = RedisListingCache::connect(&cache_config.redis_url).await?;
            cache.ping().await?;
            tracing::info!(key = %cache_config.listing_key, "Connected to listing cache");

            Ok((Arc::new(store), Arc::new(cache)))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
