//! Catalog API Server Entry Point
//!
//! Bootstraps configuration, connects the record store and cache backend,
//! ensures the schema exists, and starts the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use catalog_api::{
    create_app_router, ApiConfig, ApiError, ApiResult, AppState, CacheConfig, DbConfig,
    PgRecordStore,
};
use catalog_cache::{CacheStore, MemoryCacheStore, RedisCacheStore};

#[tokio::main]
async fn main() -> ApiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let db_config = DbConfig::from_env();
    let store = PgRecordStore::from_config(&db_config)?;
    store
        .ensure_schema()
        .await
        .map_err(|e| ApiError::database_error(format!("Schema setup failed: {}", e)))?;

    let cache_config = CacheConfig::from_env();
    let cache: Arc<dyn CacheStore> = match cache_config.url {
        Some(url) => {
            let redis = RedisCacheStore::from_url(&url).map_err(|e| {
                ApiError::service_unavailable(format!("Failed to connect cache: {}", e))
            })?;
            tracing::info!("using Redis cache backend");
            Arc::new(redis)
        }
        None => {
            tracing::warn!("no cache URL configured, using in-process cache");
            Arc::new(MemoryCacheStore::new())
        }
    };

    let api_config = ApiConfig::from_env();
    let state = AppState::new(Arc::new(store), cache);
    let app: Router = create_app_router(state, &api_config);

    let addr = resolve_bind_addr(&api_config)?;
    tracing::info!(%addr, "Starting catalog API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

fn resolve_bind_addr(config: &ApiConfig) -> ApiResult<SocketAddr> {
    let addr = format!("{}:{}", config.host, config.port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
