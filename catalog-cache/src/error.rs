//! Cache error taxonomy.
//!
//! Transport failures and serialization failures are both recoverable from
//! the coordinator's point of view: the read path falls back to the record
//! store, the write path logs and continues.

use thiserror::Error;

/// Errors produced by cache backends.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Transport error talking to the cache (connection refused, timeout,
    /// pool exhausted). A simple miss is NOT this - misses are `Ok(None)`.
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    /// A pattern invalidation deleted some keys and then failed. The count
    /// of keys deleted before the failure is preserved so callers can report
    /// partial progress.
    #[error("cache invalidation interrupted after {deleted} deletions: {reason}")]
    PartialInvalidation { deleted: u64, reason: String },

    /// Cached payload could not be serialized or deserialized.
    #[error("cache serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    /// Build an `Unavailable` error from any displayable transport error.
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }

    /// Number of keys deleted before a partial invalidation failure, if any.
    pub fn deleted_so_far(&self) -> u64 {
        match self {
            Self::PartialInvalidation { deleted, .. } => *deleted,
            _ => 0,
        }
    }
}

/// Result type alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_from_display() {
        let err = CacheError::unavailable("connection refused");
        assert!(matches!(err, CacheError::Unavailable(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_partial_invalidation_preserves_count() {
        let err = CacheError::PartialInvalidation {
            deleted: 3,
            reason: "timeout".to_string(),
        };
        assert_eq!(err.deleted_so_far(), 3);
        assert!(err.to_string().contains("3 deletions"));

        assert_eq!(CacheError::unavailable("x").deleted_so_far(), 0);
    }
}
