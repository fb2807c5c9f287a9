//! Catalog API - REST Layer with Cache-Aside Coordination
//!
//! This crate exposes the product catalog over HTTP (Axum). Reads consult
//! the cache before the database and fall back transparently; writes go to
//! the database and then invalidate or repopulate the affected cache keys.
//! Every response carries metadata describing where the data came from and
//! what the cache did.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod macros;
pub mod routes;
pub mod state;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::{ApiConfig, CacheConfig, DbConfig};
pub use coordinator::CatalogCoordinator;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_app_router;
pub use state::AppState;
pub use store::{MemoryRecordStore, PgRecordStore, RecordStore};
pub use types::*;
