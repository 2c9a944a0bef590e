//! API Configuration Module
//!
//! Configuration for the HTTP listener, CORS, backend selection, the
//! listing cache and demo-data seeding. Everything is loaded from
//! environment variables with defaults suited to local development.
//!
//! Each `from_env()` delegates to a `from_lookup()` that takes the variable
//! source as a closure, so tests can supply values without touching the
//! process environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use recipes_storage::DEFAULT_LISTING_KEY;

use crate::error::{ApiError, ApiResult};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8085;

/// Default location of the demo-data file, relative to the working directory.
pub const DEFAULT_SEED_FILE: &str = "resources/init_recipes.json";

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// Which record store and listing cache the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// PostgreSQL record store with a Redis listing cache.
    Postgres,
    /// Process-local store and cache. Nothing survives a restart.
    Memory,
}

impl Backend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "postgres" | "pg" => Some(Backend::Postgres),
            "memory" | "mem" => Some(Backend::Memory),
            _ => None,
        }
    }
}

/// HTTP listener and CORS configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface to bind.
    pub bind_host: String,

    /// Port to bind.
    pub port: u16,

    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    pub backend: Backend,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            cors_origins: Vec::new(),
            cors_max_age_secs: 86400,
            backend: Backend::Postgres,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `RECIPES_API_BIND`: Interface to bind (default: 0.0.0.0)
    /// - `PORT` or `RECIPES_API_PORT`: Port to bind (default: 8085)
    /// - `RECIPES_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `RECIPES_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `RECIPES_BACKEND`: "postgres" or "memory" (default: postgres)
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let bind_host = lookup("RECIPES_API_BIND").unwrap_or(defaults.bind_host);

        let port = lookup("PORT")
            .or_else(|| lookup("RECIPES_API_PORT"))
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);

        let cors_origins = lookup("RECIPES_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_max_age_secs = lookup("RECIPES_CORS_MAX_AGE_SECS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        let backend = match lookup("RECIPES_BACKEND") {
            Some(value) => Backend::parse(&value).unwrap_or_else(|| {
                tracing::warn!(value = %value, "Unknown RECIPES_BACKEND, using postgres");
                Backend::Postgres
            }),
            None => defaults.backend,
        };

        Self {
            bind_host,
            port,
            cors_origins,
            cors_max_age_secs,
            backend,
        }
    }

    /// The socket address to listen on.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|allowed| allowed == origin)
    }
}

// ============================================================================
// CACHE CONFIGURATION
// ============================================================================

/// Listing cache connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Redis connection URL.
    pub redis_url: String,
    /// Key the listing is cached under.
    pub listing_key: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379/0".to_string(),
            listing_key: DEFAULT_LISTING_KEY.to_string(),
        }
    }
}

impl CacheConfig {
    /// Environment variables:
    /// - `RECIPES_REDIS_URL`: Full connection URL, takes precedence
    /// - `REDIS_HOST`: `host:port`, expanded to `redis://host:port/0`
    /// - `RECIPES_LISTING_KEY`: Listing key (default: recipes)
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let redis_url = lookup("RECIPES_REDIS_URL")
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                lookup("REDIS_HOST")
                    .map(|h| h.trim().to_string())
                    .filter(|h| !h.is_empty())
                    .map(|host| format!("redis://{}/0", host))
            })
            .unwrap_or(defaults.redis_url);

        let listing_key = lookup("RECIPES_LISTING_KEY")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.listing_key);

        Self {
            redis_url,
            listing_key,
        }
    }
}

// ============================================================================
// SEED CONFIGURATION
// ============================================================================

/// Demo-data seeding at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedConfig {
    pub enabled: bool,
    pub path: PathBuf,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from(DEFAULT_SEED_FILE),
        }
    }
}

impl SeedConfig {
    /// Environment variables:
    /// - `INIT`: "true" (any case) seeds the store at startup
    /// - `RECIPES_SEED_FILE`: JSON array of recipes (default: resources/init_recipes.json)
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = lookup("INIT")
            .map(|s| s.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let path = lookup("RECIPES_SEED_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SEED_FILE));

        Self { enabled, path }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ApiConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.port, 8085);
        assert_eq!(config.bind_host, "0.0.0.0");
        assert!(config.cors_origins.is_empty());
        assert_eq!(config.cors_max_age_secs, 86400);
        assert_eq!(config.backend, Backend::Postgres);
        assert_eq!(config.bind_addr().unwrap().port(), 8085);
    }

    #[test]
    fn test_port_precedence_and_fallback() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("PORT", "9000"),
            ("RECIPES_API_PORT", "9100"),
        ]));
        assert_eq!(config.port, 9000);

        let config = ApiConfig::from_lookup(lookup_from(&[("RECIPES_API_PORT", "9100")]));
        assert_eq!(config.port, 9100);

        let config = ApiConfig::from_lookup(lookup_from(&[("PORT", "not-a-port")]));
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_bind_address_is_rejected() {
        let config = ApiConfig::from_lookup(lookup_from(&[("RECIPES_API_BIND", "not a host")]));
        let err = config.bind_addr().unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidInput);
    }

    #[test]
    fn test_backend_selection() {
        let config = ApiConfig::from_lookup(lookup_from(&[("RECIPES_BACKEND", "Memory")]));
        assert_eq!(config.backend, Backend::Memory);

        let config = ApiConfig::from_lookup(lookup_from(&[("RECIPES_BACKEND", "mongo")]));
        assert_eq!(config.backend, Backend::Postgres);
    }

    #[test]
    fn test_cors_origins() {
        let config = ApiConfig::from_lookup(lookup_from(&[(
            "RECIPES_CORS_ORIGINS",
            "https://cook.example, ,https://app.cook.example",
        )]));
        assert_eq!(config.cors_origins.len(), 2);
        assert!(config.is_origin_allowed("https://cook.example"));
        assert!(!config.is_origin_allowed("https://evil.example"));

        assert!(ApiConfig::default().is_origin_allowed("http://localhost:3000"));
    }

    #[test]
    fn test_cache_config_from_redis_host() {
        let config = CacheConfig::from_lookup(lookup_from(&[("REDIS_HOST", "cache:6379")]));
        assert_eq!(config.redis_url, "redis://cache:6379/0");
        assert_eq!(config.listing_key, "recipes");

        let config = CacheConfig::from_lookup(lookup_from(&[
            ("REDIS_HOST", "cache:6379"),
            ("RECIPES_REDIS_URL", "redis://other:6380/2"),
            ("RECIPES_LISTING_KEY", "recipes:v2"),
        ]));
        assert_eq!(config.redis_url, "redis://other:6380/2");
        assert_eq!(config.listing_key, "recipes:v2");
    }

    #[test]
    fn test_seed_config() {
        assert_eq!(SeedConfig::from_lookup(lookup_from(&[])), SeedConfig::default());

        let config = SeedConfig::from_lookup(lookup_from(&[
            ("INIT", "TRUE"),
            ("RECIPES_SEED_FILE", "/data/seed.json"),
        ]));
        assert!(config.enabled);
        assert_eq!(config.path, PathBuf::from("/data/seed.json"));

        let config = SeedConfig::from_lookup(lookup_from(&[("INIT", "1")]));
        assert!(!config.enabled);
    }
}
