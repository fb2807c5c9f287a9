//! Catalog Coordinator
//!
//! Cache-aside orchestration between the record store and the cache store.
//! Reads consult the cache first and fall back to the store; store results
//! are written back with a per-query-class TTL. Writes go to the store first,
//! then invalidate or repopulate the affected keys.
//!
//! The one rule everything here serves: a cache failure never fails the
//! request. Lookup errors degrade to a store read, write-back errors are
//! logged and reported in the response metadata, and invalidation errors
//! leave the store write standing.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use catalog_cache::{CacheStore, QueryKey};
use catalog_core::{CatalogError, CatalogResult, Item, ItemDraft, ItemId, ItemPatch};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiResult;
use crate::store::RecordStore;
use crate::types::{
    CacheClearResponse, CacheStatus, CreateMeta, ItemCreateResponse, ItemListResponse,
    ItemResponse, ItemUpdateResponse, MutationMeta, QueryMeta,
};

// ============================================================================
// COORDINATOR
// ============================================================================

/// Coordinates catalog reads and writes across the record store and cache.
///
/// Stateless apart from its two handles; cheap to clone and share across
/// request handlers.
#[derive(Clone)]
pub struct CatalogCoordinator {
    store: Arc<dyn RecordStore>,
    cache: Arc<dyn CacheStore>,
}

/// Outcome of a cache lookup.
enum Lookup<T> {
    Hit(T),
    Miss,
    /// Transport failure. The cache is presumed down for the rest of the
    /// request, so no write-back is attempted.
    Failed,
}

impl CatalogCoordinator {
    pub fn new(store: Arc<dyn RecordStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self { store, cache }
    }

    // ========================================================================
    // Cache helpers
    // ========================================================================

    /// Look up and deserialize a cached value. A corrupt payload counts as a
    /// miss (the entry gets overwritten by the write-back); a transport error
    /// counts as `Failed`.
    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> (Lookup<T>, u64) {
        let started = Instant::now();
        let outcome = match self.cache.get(key).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(value) => Lookup::Hit(value),
                Err(err) => {
                    tracing::warn!(key, error = %err, "discarding corrupt cache entry");
                    Lookup::Miss
                }
            },
            Ok(None) => Lookup::Miss,
            Err(err) => {
                tracing::warn!(key, error = %err, "cache lookup failed, falling back to store");
                Lookup::Failed
            }
        };
        (outcome, elapsed_ms(started))
    }

    /// Serialize and write a value back under `key` with the key's TTL.
    async fn populate<T: Serialize>(&self, key: &QueryKey<'_>, value: &T) -> (CacheStatus, u64) {
        let started = Instant::now();
        let rendered = key.render();

        let result = match serde_json::to_vec(value) {
            Ok(bytes) => self.cache.set_with_ttl(&rendered, bytes, key.ttl()).await,
            Err(err) => Err(err.into()),
        };

        let status = match result {
            Ok(()) => CacheStatus::Cached,
            Err(err) => {
                tracing::warn!(key = %rendered, error = %err, "cache write-back failed");
                CacheStatus::CacheFailed
            }
        };
        (status, elapsed_ms(started))
    }

    /// Delete a single key, reporting success and elapsed time. Failures are
    /// logged, never propagated.
    async fn evict(&self, key: &QueryKey<'_>) -> (bool, u64) {
        let started = Instant::now();
        let rendered = key.render();
        let ok = match self.cache.delete(&rendered).await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(key = %rendered, error = %err, "cache invalidation failed");
                false
            }
        };
        (ok, elapsed_ms(started))
    }

    /// Shared read path: cache first, store on miss, best-effort write-back.
    async fn read_cached<T, F, Fut>(&self, key: QueryKey<'_>, fetch: F) -> ApiResult<(T, QueryMeta)>
    where
        T: Serialize + DeserializeOwned + Countable,
        F: FnOnce() -> Fut,
        Fut: Future<Output = CatalogResult<T>>,
    {
        let started = Instant::now();
        let rendered = key.render();

        let (lookup, cache_ms) = self.lookup::<T>(&rendered).await;
        let cache_down = matches!(lookup, Lookup::Failed);
        if let Lookup::Hit(value) = lookup {
            let meta = QueryMeta::cache_hit(cache_ms, elapsed_ms(started), value.count());
            return Ok((value, meta));
        }

        let db_started = Instant::now();
        let value = fetch().await?;
        let db_ms = elapsed_ms(db_started);

        let (cache_time_ms, status) = if cache_down {
            // Cache transport already failed this request; skip the write-back.
            (Some(cache_ms), CacheStatus::NotCached)
        } else {
            let (status, populate_ms) = self.populate(&key, &value).await;
            (Some(cache_ms + populate_ms), status)
        };

        let meta = QueryMeta::from_store(
            db_ms,
            cache_time_ms,
            elapsed_ms(started),
            value.count(),
            status,
        );
        Ok((value, meta))
    }

    // ========================================================================
    // Read operations
    // ========================================================================

    /// Every item, active and inactive, newest first.
    pub async fn list_items(&self) -> ApiResult<ItemListResponse> {
        let store = self.store.clone();
        let (data, meta) = self
            .read_cached(QueryKey::All, move || async move { store.find_all().await })
            .await?;
        Ok(ItemListResponse { data, meta })
    }

    /// Single item by id. Inactive items are reported as not found even when
    /// the row still exists. Misses are never cached: the not-found error is
    /// raised inside the fetch, before any write-back.
    pub async fn get_item(&self, id: ItemId) -> ApiResult<ItemResponse> {
        let store = self.store.clone();
        let (data, meta) = self
            .read_cached(QueryKey::Item(id), move || async move {
                store
                    .find_by_id(id)
                    .await?
                    .filter(|item| item.is_active)
                    .ok_or(CatalogError::NotFound(id))
            })
            .await?;
        Ok(ItemResponse { data, meta })
    }

    /// Active items in a category.
    pub async fn items_by_category(&self, category: &str) -> ApiResult<ItemListResponse> {
        let store = self.store.clone();
        let (data, meta) = self
            .read_cached(QueryKey::Category(category), move || async move {
                store.find_by_category(category).await
            })
            .await?;
        Ok(ItemListResponse { data, meta })
    }

    /// Active items matching a free-text term.
    pub async fn search_items(&self, term: &str) -> ApiResult<ItemListResponse> {
        let store = self.store.clone();
        let (data, meta) = self
            .read_cached(QueryKey::Search(term), move || async move {
                store.search(term).await
            })
            .await?;
        Ok(ItemListResponse { data, meta })
    }

    // ========================================================================
    // Write operations
    // ========================================================================

    /// Insert a new item, invalidate the aggregate list and cache the new
    /// item under its id.
    pub async fn create_item(&self, draft: ItemDraft) -> ApiResult<ItemCreateResponse> {
        let started = Instant::now();

        let db_started = Instant::now();
        let item = self.store.insert(draft).await?;
        let db_ms = elapsed_ms(db_started);

        let (cleared, clear_ms) = self.evict(&QueryKey::All).await;
        let (populate_status, populate_ms) = self.populate(&QueryKey::Item(item.id), &item).await;

        let cache_status = if cleared && populate_status == CacheStatus::Cached {
            CacheStatus::CacheClearedAndUpdated
        } else {
            CacheStatus::CacheManagementFailed
        };

        Ok(ItemCreateResponse {
            data: item,
            meta: CreateMeta {
                create_time_ms: db_ms,
                db_time_ms: db_ms,
                cache_time_ms: Some(clear_ms + populate_ms),
                total_time_ms: elapsed_ms(started),
                cache_cleared: cleared,
                cache_status,
            },
        })
    }

    /// Apply a patch, repopulate the item's own key with the fresh row, and
    /// invalidate the aggregate list.
    pub async fn update_item(&self, id: ItemId, patch: ItemPatch) -> ApiResult<ItemUpdateResponse> {
        let started = Instant::now();

        let db_started = Instant::now();
        let item = self.store.update(id, patch).await?;
        let db_ms = elapsed_ms(db_started);

        let (populate_status, populate_ms) = self.populate(&QueryKey::Item(id), &item).await;
        let (cleared, clear_ms) = self.evict(&QueryKey::All).await;

        let cache_status = if cleared && populate_status == CacheStatus::Cached {
            CacheStatus::CacheClearedAndUpdated
        } else {
            CacheStatus::CacheManagementFailed
        };

        Ok(ItemUpdateResponse {
            data: item,
            meta: MutationMeta {
                db_time_ms: db_ms,
                cache_time_ms: Some(populate_ms + clear_ms),
                total_time_ms: elapsed_ms(started),
                cache_status,
            },
        })
    }

    /// Soft-delete an item and drop both its own key and the aggregate list.
    /// The cache outcome does not affect the result.
    pub async fn delete_item(&self, id: ItemId) -> ApiResult<()> {
        self.store.soft_delete(id).await?;

        let (item_ok, _) = self.evict(&QueryKey::Item(id)).await;
        let (all_ok, _) = self.evict(&QueryKey::All).await;
        if !item_ok || !all_ok {
            tracing::warn!(%id, "stale cache entries may outlive a deleted item until TTL");
        }
        Ok(())
    }

    /// Administrative bulk clear of every catalog key. Reports partial
    /// progress instead of failing.
    pub async fn clear_cache(&self) -> CacheClearResponse {
        match self.cache.delete_by_pattern(&QueryKey::wildcard()).await {
            Ok(cleared) => CacheClearResponse {
                cleared,
                complete: true,
            },
            Err(err) => {
                tracing::warn!(error = %err, "bulk cache clear interrupted");
                CacheClearResponse {
                    cleared: err.deleted_so_far(),
                    complete: false,
                }
            }
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

// ============================================================================
// COUNTABLE
// ============================================================================

/// Item count for response metadata. Lists report their length, point reads
/// report nothing.
pub trait Countable {
    fn count(&self) -> Option<usize>;
}

impl Countable for Vec<Item> {
    fn count(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl Countable for Item {
    fn count(&self) -> Option<usize> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRecordStore;
    use crate::types::Source;
    use catalog_cache::MemoryCacheStore;

    fn coordinator() -> CatalogCoordinator {
        CatalogCoordinator::new(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(MemoryCacheStore::new()),
        )
    }

    fn draft(name: &str, price: f64) -> ItemDraft {
        ItemDraft {
            name: name.to_string(),
            price,
            category: Some("tools".to_string()),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_first_read_misses_second_read_hits() {
        let coord = coordinator();
        coord.create_item(draft("Widget", 9.99)).await.unwrap();

        let first = coord.list_items().await.unwrap();
        assert_eq!(first.meta.source, Source::Database);
        assert_eq!(first.meta.cache_status, CacheStatus::Cached);
        assert_eq!(first.meta.count, Some(1));

        let second = coord.list_items().await.unwrap();
        assert_eq!(second.meta.source, Source::Cache);
        assert_eq!(second.meta.cache_status, CacheStatus::Hit);
        assert!(second.meta.cached);
        assert_eq!(
            serde_json::to_value(&first.data).unwrap(),
            serde_json::to_value(&second.data).unwrap()
        );
    }

    #[tokio::test]
    async fn test_create_caches_item_under_its_id() {
        let coord = coordinator();
        let created = coord.create_item(draft("Widget", 9.99)).await.unwrap();
        assert!(created.meta.cache_cleared);
        assert_eq!(
            created.meta.cache_status,
            CacheStatus::CacheClearedAndUpdated
        );

        // Point read is served from the cache populated by create.
        let read = coord.get_item(created.data.id).await.unwrap();
        assert_eq!(read.meta.source, Source::Cache);
        assert_eq!(read.data.price, 9.99);
    }

    #[tokio::test]
    async fn test_update_repopulates_id_key_immediately() {
        let coord = coordinator();
        let created = coord.create_item(draft("Widget", 9.99)).await.unwrap();

        let patch = ItemPatch {
            price: Some(19.99),
            ..Default::default()
        };
        let updated = coord.update_item(created.data.id, patch).await.unwrap();
        assert_eq!(updated.data.price, 19.99);
        assert_eq!(
            updated.meta.cache_status,
            CacheStatus::CacheClearedAndUpdated
        );

        // The very next point read hits the cache and sees the new price.
        let read = coord.get_item(created.data.id).await.unwrap();
        assert_eq!(read.meta.source, Source::Cache);
        assert_eq!(read.data.price, 19.99);
    }

    #[tokio::test]
    async fn test_delete_hides_item_everywhere() {
        let coord = coordinator();
        let created = coord.create_item(draft("Widget", 9.99)).await.unwrap();
        coord.list_items().await.unwrap();

        coord.delete_item(created.data.id).await.unwrap();

        let err = coord.get_item(created.data.id).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ItemNotFound);
        assert!(coord
            .items_by_category("tools")
            .await
            .unwrap()
            .data
            .is_empty());
        assert!(coord.search_items("Widget").await.unwrap().data.is_empty());

        // List-all still shows the row, flagged inactive.
        let all = coord.list_items().await.unwrap();
        assert_eq!(all.data.len(), 1);
        assert!(!all.data[0].is_active);
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let coord = coordinator();
        let created = coord.create_item(draft("Widget", 9.99)).await.unwrap();

        coord.delete_item(created.data.id).await.unwrap();
        let err = coord.delete_item(created.data.id).await.unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ItemNotFound);
    }

    #[tokio::test]
    async fn test_empty_results_are_cached() {
        let coord = coordinator();

        let first = coord.search_items("nothing").await.unwrap();
        assert_eq!(first.meta.source, Source::Database);
        assert_eq!(first.meta.cache_status, CacheStatus::Cached);
        assert_eq!(first.meta.count, Some(0));

        let second = coord.search_items("nothing").await.unwrap();
        assert_eq!(second.meta.source, Source::Cache);
    }

    #[tokio::test]
    async fn test_clear_cache_reports_count() {
        let coord = coordinator();
        coord.create_item(draft("Widget", 9.99)).await.unwrap();
        coord.list_items().await.unwrap();
        coord.search_items("Widget").await.unwrap();

        let cleared = coord.clear_cache().await;
        assert!(cleared.complete);
        // At least the all-list, the item and the search entry.
        assert!(cleared.cleared >= 3);

        let after = coord.list_items().await.unwrap();
        assert_eq!(after.meta.source, Source::Database);
    }
}
