//! Cache store trait.
//!
//! Abstracts over cache backends (Redis, in-memory). Implementations must be
//! thread-safe; every method is fallible with `CacheError::Unavailable` on
//! transport problems, and a plain miss is `Ok(None)` - never an error.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{CacheError, CacheResult};

/// Key/value store with per-key expiration and pattern enumeration.
///
/// Values are opaque bytes; serialization is the caller's concern. Keys are
/// plain strings - see `keys::QueryKey` for how the catalog namespaces them.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a value. Returns `Ok(None)` on miss or expiry.
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Store a value with a TTL. The entry is treated as absent once the TTL
    /// elapses. TTLs under one second are rounded up to one second (SETEX
    /// rejects zero).
    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()>;

    /// Delete a key. Returns the number of keys removed (0 or 1).
    async fn delete(&self, key: &str) -> CacheResult<u64>;

    /// Enumerate keys matching a glob pattern (`*` and `?` wildcards).
    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>>;

    /// Liveness check.
    async fn ping(&self) -> CacheResult<()>;

    /// Enumerate keys matching `pattern` and delete each one.
    ///
    /// Not atomic: if a deletion fails partway through, the error carries the
    /// count of keys already removed.
    async fn delete_by_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let keys = self.keys(pattern).await?;
        let mut deleted = 0u64;
        for key in &keys {
            match self.delete(key).await {
                Ok(n) => deleted += n,
                Err(err) => {
                    return Err(CacheError::PartialInvalidation {
                        deleted,
                        reason: err.to_string(),
                    })
                }
            }
        }
        Ok(deleted)
    }
}
