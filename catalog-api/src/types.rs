//! Request and response types for the catalog API.
//!
//! Every read response is an envelope: the payload plus metadata describing
//! where the data came from (cache or database), how long each external call
//! took, and what happened to the cache along the way. The envelope is
//! constructed fresh per request by the coordinator and never persisted.

use catalog_core::{Item, ItemDraft, ItemPatch};
use serde::{Deserialize, Serialize};

// ============================================================================
// REQUESTS
// ============================================================================

/// Body of `POST /products`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<CreateItemRequest> for ItemDraft {
    fn from(req: CreateItemRequest) -> Self {
        ItemDraft {
            name: req.name,
            price: req.price,
            category: req.category,
            description: req.description,
        }
    }
}

/// Body of `PUT /products/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItemRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<UpdateItemRequest> for ItemPatch {
    fn from(req: UpdateItemRequest) -> Self {
        ItemPatch {
            name: req.name,
            price: req.price,
            category: req.category,
            description: req.description,
        }
    }
}

// ============================================================================
// PROVENANCE AND CACHE STATUS
// ============================================================================

/// Where a response payload was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Database,
}

/// What happened to the cache during an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// Read served straight from the cache.
    Hit,
    /// Store result was written back to the cache.
    Cached,
    /// Store result could not be written back; the response is unaffected.
    CacheFailed,
    /// No cache write was attempted (the earlier cache lookup already
    /// reported the transport down).
    NotCached,
    /// Write path: aggregate key cleared and per-id key repopulated.
    CacheClearedAndUpdated,
    /// Write path: at least one cache step failed; the store write stands.
    CacheManagementFailed,
}

// ============================================================================
// READ ENVELOPE
// ============================================================================

/// Metadata attached to every read response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMeta {
    pub source: Source,
    /// Duration of the call that produced the payload.
    pub fetch_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_time_ms: Option<u64>,
    pub total_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub cached: bool,
    pub cache_status: CacheStatus,
}

impl QueryMeta {
    /// Metadata for a cache hit.
    pub fn cache_hit(cache_time_ms: u64, total_time_ms: u64, count: Option<usize>) -> Self {
        Self {
            source: Source::Cache,
            fetch_time_ms: cache_time_ms,
            db_time_ms: None,
            cache_time_ms: Some(cache_time_ms),
            total_time_ms,
            count,
            cached: true,
            cache_status: CacheStatus::Hit,
        }
    }

    /// Metadata for a store read, with whatever happened to the cache.
    pub fn from_store(
        db_time_ms: u64,
        cache_time_ms: Option<u64>,
        total_time_ms: u64,
        count: Option<usize>,
        cache_status: CacheStatus,
    ) -> Self {
        Self {
            source: Source::Database,
            fetch_time_ms: db_time_ms,
            db_time_ms: Some(db_time_ms),
            cache_time_ms,
            total_time_ms,
            count,
            cached: cache_status == CacheStatus::Cached,
            cache_status,
        }
    }
}

/// Envelope for list reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemListResponse {
    pub data: Vec<Item>,
    pub meta: QueryMeta,
}

/// Envelope for point reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResponse {
    pub data: Item,
    pub meta: QueryMeta,
}

// ============================================================================
// WRITE ENVELOPES
// ============================================================================

/// Metadata attached to a create response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMeta {
    /// Duration of the store insert.
    pub create_time_ms: u64,
    pub db_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_time_ms: Option<u64>,
    pub total_time_ms: u64,
    /// Whether the aggregate `all` key was removed.
    pub cache_cleared: bool,
    pub cache_status: CacheStatus,
}

/// Envelope for create responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCreateResponse {
    pub data: Item,
    pub meta: CreateMeta,
}

/// Metadata attached to an update response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationMeta {
    pub db_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_time_ms: Option<u64>,
    pub total_time_ms: u64,
    pub cache_status: CacheStatus,
}

/// Envelope for update responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemUpdateResponse {
    pub data: Item,
    pub meta: MutationMeta,
}

/// Response of the administrative bulk cache clear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheClearResponse {
    /// Keys removed. On partial failure this is the count removed before the
    /// cache went away.
    pub cleared: u64,
    /// False when the clear was interrupted by a cache failure.
    pub complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serialization() {
        assert_eq!(serde_json::to_string(&Source::Cache).unwrap(), "\"cache\"");
        assert_eq!(
            serde_json::to_string(&Source::Database).unwrap(),
            "\"database\""
        );
    }

    #[test]
    fn test_cache_status_serialization() {
        assert_eq!(serde_json::to_string(&CacheStatus::Hit).unwrap(), "\"hit\"");
        assert_eq!(
            serde_json::to_string(&CacheStatus::CacheFailed).unwrap(),
            "\"cache_failed\""
        );
        assert_eq!(
            serde_json::to_string(&CacheStatus::CacheClearedAndUpdated).unwrap(),
            "\"cache_cleared_and_updated\""
        );
    }

    #[test]
    fn test_query_meta_cache_hit() {
        let meta = QueryMeta::cache_hit(2, 3, Some(10));
        assert_eq!(meta.source, Source::Cache);
        assert!(meta.cached);
        assert_eq!(meta.cache_status, CacheStatus::Hit);
        assert_eq!(meta.fetch_time_ms, 2);
        assert!(meta.db_time_ms.is_none());
    }

    #[test]
    fn test_query_meta_from_store() {
        let meta = QueryMeta::from_store(12, Some(1), 14, None, CacheStatus::Cached);
        assert_eq!(meta.source, Source::Database);
        assert!(meta.cached);
        assert_eq!(meta.db_time_ms, Some(12));

        let failed = QueryMeta::from_store(12, Some(1), 14, None, CacheStatus::CacheFailed);
        assert!(!failed.cached);
    }

    #[test]
    fn test_update_request_into_patch() {
        let req = UpdateItemRequest {
            price: Some(19.99),
            ..Default::default()
        };
        let patch: ItemPatch = req.into();
        assert_eq!(patch.price, Some(19.99));
        assert!(patch.name.is_none());
    }
}
