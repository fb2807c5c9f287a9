//! Configuration Module
//!
//! Configuration for the database pool, the cache connection and the HTTP
//! server. Everything is loaded from environment variables with sensible
//! defaults for development.

use std::time::Duration;

use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;

use crate::error::{ApiError, ApiResult};

// ============================================================================
// DATABASE CONFIGURATION
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
            dbname: "products_db".to_string(),
            user: "postgres".to_string(),
            password: "".to_string(),
            max_size: 16,
            timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    /// Create a new database configuration from environment variables.
    ///
    /// Environment variables: `CATALOG_DB_HOST`, `CATALOG_DB_PORT`,
    /// `CATALOG_DB_NAME`, `CATALOG_DB_USER`, `CATALOG_DB_PASSWORD`,
    /// `CATALOG_DB_POOL_SIZE`, `CATALOG_DB_TIMEOUT` (seconds).
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("CATALOG_DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("CATALOG_DB_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("CATALOG_DB_NAME")
                .unwrap_or_else(|_| "products_db".to_string()),
            user: std::env::var("CATALOG_DB_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: std::env::var("CATALOG_DB_PASSWORD").unwrap_or_default(),
            max_size: std::env::var("CATALOG_DB_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            timeout: Duration::from_secs(
                std::env::var("CATALOG_DB_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
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

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let pool = cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| ApiError::database_error(format!("Failed to create pool: {}", e)))?;

        Ok(pool)
    }
}

// ============================================================================
// CACHE CONFIGURATION
// ============================================================================

/// Cache connection configuration.
///
/// When no URL is configured the server falls back to the in-process
/// `MemoryCacheStore`, which keeps dev setups Redis-free.
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Redis connection URL (e.g. `redis://localhost:6379`). `None` selects
    /// the in-memory backend.
    pub url: Option<String>,
}

impl CacheConfig {
    /// Create a cache configuration from environment variables.
    ///
    /// Environment variables: `CATALOG_REDIS_URL`.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("CATALOG_REDIS_URL").ok().filter(|s| !s.is_empty()),
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
        }
    }
}

impl ApiConfig {
    /// Create an ApiConfig from environment variables.
    ///
    /// Environment variables: `CATALOG_API_BIND`, `PORT` (or
    /// `CATALOG_API_PORT`), `CATALOG_CORS_ORIGINS`.
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("CATALOG_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            host: std::env::var("CATALOG_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .or_else(|| std::env::var("CATALOG_API_PORT").ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            cors_origins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_config_defaults() {
        let config = DbConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.dbname, "products_db");
        assert_eq!(config.max_size, 16);
    }

    #[test]
    fn test_cache_config_default_is_memory() {
        let config = CacheConfig::default();
        assert!(config.url.is_none());
    }

    #[test]
    fn test_api_config_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 3000);
        assert!(config.cors_origins.is_empty());
    }
}
