//! Health Check Endpoints
//!
//! - /health/ping - Simple liveness check
//! - /health/ready - Record store and listing cache connectivity
//!
//! No authentication required for health endpoints.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use recipes_core::RecipeResult;
use recipes_storage::CacheStats;
use serde::{Deserialize, Serialize};

use crate::services::RecipeService;

// ============================================================================
// TYPES
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthDetails {
    pub store: ComponentHealth,
    pub cache: ComponentHealth,
    pub listing: CacheStats,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentHealth {
    fn from_probe(started: Instant, result: RecipeResult<()>) -> Self {
        match result {
            Ok(()) => Self {
                status: HealthStatus::Healthy,
                latency_ms: Some(started.elapsed().as_millis() as u64),
                error: None,
            },
            Err(e) => Self {
                status: HealthStatus::Unhealthy,
                latency_ms: None,
                error: Some(e.to_string()),
            },
        }
    }
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Clone)]
pub struct HealthState {
    pub service: Arc<RecipeService>,
    pub start_time: Instant,
}

impl HealthState {
    pub fn new(service: Arc<RecipeService>) -> Self {
        Self {
            service,
            start_time: Instant::now(),
        }
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /health/ping
pub async fn ping() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        details: None,
    };
    (StatusCode::OK, Json(response))
}

/// GET /health/ready - 200 when store and cache both answer, 503 otherwise
pub async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let started = Instant::now();
    let store = ComponentHealth::from_probe(started, state.service.ping_store().await);

    let started = Instant::now();
    let cache = ComponentHealth::from_probe(started, state.service.ping_cache().await);

    let overall_status =
        if store.status == HealthStatus::Healthy && cache.status == HealthStatus::Healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };

    let response = HealthResponse {
        status: overall_status,
        details: Some(HealthDetails {
            store,
            cache,
            listing: state.service.cache_stats(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.start_time.elapsed().as_secs(),
        }),
    };

    let status_code = if overall_status == HealthStatus::Healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create health check router, to be nested under `/health`.
pub fn create_router(service: Arc<RecipeService>) -> Router {
    let state = Arc::new(HealthState::new(service));

    Router::new()
        .route("/ping", get(ping))
        .route("/ready", get(readiness))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            details: None,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"status":"healthy"}"#);
    }

    #[test]
    fn test_component_health_with_error() {
        let component = ComponentHealth {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            error: Some("Connection refused".to_string()),
        };

        let json = serde_json::to_string(&component).unwrap();
        assert!(json.contains("\"status\":\"unhealthy\""));
        assert!(json.contains("Connection refused"));
        assert!(!json.contains("latency_ms"));
    }

    #[test]
    fn test_health_details_include_listing_stats() {
        let details = HealthDetails {
            store: ComponentHealth::from_probe(Instant::now(), Ok(())),
            cache: ComponentHealth::from_probe(Instant::now(), Ok(())),
            listing: CacheStats {
                hits: 3,
                ..Default::default()
            },
            version: "0.1.0".to_string(),
            uptime_seconds: 60,
        };

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["listing"]["hits"], 3);
        assert_eq!(json["store"]["status"], "healthy");
        assert_eq!(json["uptime_seconds"], 60);
    }
}
