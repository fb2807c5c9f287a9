//! REST API Routes Module
//!
//! Route handlers organized by concern:
//! - Product CRUD, category listing and search (through the coordinator)
//! - Raw cache passthrough for debugging and operations
//! - Health check endpoints (Kubernetes-compatible)
//! - CORS support for browser-based clients

pub mod cache;
pub mod health;
pub mod products;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::state::AppState;

// Re-export route creation functions for convenience
pub use cache::create_router as cache_router;
pub use health::create_router as health_router;
pub use products::create_router as products_router;

/// Build the CORS layer from configuration. An empty origin list allows any
/// origin (dev mode).
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    if config.cors_origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}

/// Create the full application router.
pub fn create_app_router(state: AppState, config: &ApiConfig) -> Router {
    Router::new()
        .nest("/products", products::create_router())
        .nest("/cache", cache::create_router())
        .nest("/health", health::create_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
        .with_state(state)
}
