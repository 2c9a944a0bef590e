//! REST API Routes Module
//!
//! Includes:
//! - Recipe CRUD routes under `/recipes`
//! - Health check endpoints under `/health`
//! - Request tracing and CORS for browser-based clients

pub mod health;
pub mod recipe;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::services::RecipeService;

/// Create the complete API router.
pub fn create_api_router(service: Arc<RecipeService>, api_config: &ApiConfig) -> Router {
    Router::new()
        .nest("/recipes", recipe::create_router(Arc::clone(&service)))
        .nest("/health", health::create_router(service))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(api_config))
}

fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!("CORS: allowing origins: {:?}", config.cors_origins);
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}
