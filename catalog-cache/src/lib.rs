//! Catalog Cache - cache store abstraction and backends.
//!
//! This crate defines the `CacheStore` trait consumed by the cache-aside
//! coordinator, the key namespacing policy that maps logical catalog queries
//! to cache keys, and two backends:
//!
//! - `MemoryCacheStore`: process-local map with per-entry expiry, used by
//!   tests and dev mode.
//! - `RedisCacheStore`: deadpool-redis pool over a Redis server.
//!
//! Backends report transport problems as `CacheError::Unavailable`; a plain
//! miss is never an error. Callers (the coordinator) decide whether a cache
//! failure matters - in the catalog read path it never does.

pub mod error;
pub mod keys;
pub mod memory;
pub mod redis_store;
pub mod traits;

pub use error::{CacheError, CacheResult};
pub use keys::{QueryKey, DEFAULT_TTL, KEY_PREFIX, SEARCH_TTL};
pub use memory::MemoryCacheStore;
pub use redis_store::RedisCacheStore;
pub use traits::CacheStore;
