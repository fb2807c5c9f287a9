//! Shared application state for Axum routers.

use std::sync::Arc;

use catalog_cache::CacheStore;

use crate::coordinator::CatalogCoordinator;
use crate::store::RecordStore;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Cache-aside coordinator. Product routes go through this; it owns the
    /// cache-first read and targeted invalidation logic.
    pub catalog: CatalogCoordinator,
    /// Direct record store handle, for health probes.
    pub store: Arc<dyn RecordStore>,
    /// Direct cache handle, for health probes and the raw cache passthrough
    /// routes.
    pub cache: Arc<dyn CacheStore>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            catalog: CatalogCoordinator::new(store.clone(), cache.clone()),
            store,
            cache,
            start_time: std::time::Instant::now(),
        }
    }
}

// Use macro to reduce boilerplate for FromRef implementations
crate::impl_from_ref!(CatalogCoordinator, catalog);
crate::impl_from_ref!(Arc<dyn RecordStore>, store);
crate::impl_from_ref!(Arc<dyn CacheStore>, cache);
crate::impl_from_ref!(std::time::Instant, start_time);
