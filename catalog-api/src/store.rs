//! Record Store
//!
//! The durable backing store for catalog items. `RecordStore` is the seam
//! the coordinator consumes; `PgRecordStore` is the PostgreSQL implementation
//! over a deadpool connection pool, and `MemoryRecordStore` is a process-local
//! implementation for tests and Redis/Postgres-free development.
//!
//! Soft-delete filtering is expressed once, as an `active_only` flag on the
//! shared scan helper, rather than duplicated per query.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use catalog_core::{new_item_id, CatalogError, CatalogResult, Item, ItemDraft, ItemId, ItemPatch};
use chrono::Utc;
use deadpool_postgres::Pool;
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;

use crate::config::DbConfig;
use crate::error::ApiResult;

// ============================================================================
// RECORD STORE TRAIT
// ============================================================================

/// Point lookups, scans, search and mutations over catalog items.
///
/// Implementations own their consistency guarantees; the coordinator adds no
/// locking and never retries. Store failures surface as
/// `CatalogError::Store` and are always propagated to the caller.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All items, regardless of the active flag. The list-all path
    /// deliberately includes inactive items (observed behavior, preserved);
    /// category and search scans are active-only.
    async fn find_all(&self) -> CatalogResult<Vec<Item>>;

    /// Point lookup by id, active or not.
    async fn find_by_id(&self, id: ItemId) -> CatalogResult<Option<Item>>;

    /// Active items in a category, newest first.
    async fn find_by_category(&self, category: &str) -> CatalogResult<Vec<Item>>;

    /// Active items whose name, description or category case-insensitively
    /// contains `term`, newest first.
    async fn search(&self, term: &str) -> CatalogResult<Vec<Item>>;

    /// Insert a new item. Assigns id and creation timestamp. Fails with
    /// `CatalogError::Validation` if the draft violates field constraints.
    async fn insert(&self, draft: ItemDraft) -> CatalogResult<Item>;

    /// Apply a patch to an existing, active item. Fails with
    /// `CatalogError::NotFound` if the item is missing or inactive.
    async fn update(&self, id: ItemId, patch: ItemPatch) -> CatalogResult<Item>;

    /// Mark an active item inactive. Fails with `CatalogError::NotFound` if
    /// the item is missing or already inactive. The row is never removed.
    async fn soft_delete(&self, id: ItemId) -> CatalogResult<()>;

    /// Liveness check for health endpoints.
    async fn ping(&self) -> CatalogResult<()>;
}

// ============================================================================
// POSTGRES IMPLEMENTATION
// ============================================================================

const COLUMNS: &str = "id, name, price, category, description, is_active, created_at";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS products (
    id          UUID PRIMARY KEY,
    name        VARCHAR(255) NOT NULL,
    price       DOUBLE PRECISION NOT NULL,
    category    TEXT,
    description TEXT,
    is_active   BOOLEAN NOT NULL DEFAULT TRUE,
    created_at  TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_products_category ON products (category) WHERE is_active;
CREATE INDEX IF NOT EXISTS idx_products_created_at ON products (created_at DESC);
";

/// PostgreSQL record store over a deadpool connection pool.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: Pool,
}

impl PgRecordStore {
    /// Wrap an existing pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create a store from configuration.
    pub fn from_config(config: &DbConfig) -> ApiResult<Self> {
        let pool = config.create_pool()?;
        Ok(Self::new(pool))
    }

    /// Current pool size, for observability.
    pub fn pool_size(&self) -> usize {
        self.pool.status().size
    }

    /// Create the products table and indexes if they do not exist.
    pub async fn ensure_schema(&self) -> CatalogResult<()> {
        let conn = self.get_conn().await?;
        conn.batch_execute(SCHEMA)
            .await
            .map_err(|e| CatalogError::Store(e.to_string()))?;
        Ok(())
    }

    async fn get_conn(&self) -> CatalogResult<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| CatalogError::Store(format!("connection pool: {}", e)))
    }

    /// Shared scan helper. `clause` filters, `active_only` appends the
    /// soft-delete filter so it is written in exactly one place.
    async fn list_where(
        &self,
        clause: &str,
        params: &[&(dyn ToSql + Sync)],
        active_only: bool,
    ) -> CatalogResult<Vec<Item>> {
        let active = if active_only { " AND is_active" } else { "" };
        let sql = format!(
            "SELECT {} FROM products WHERE {}{} ORDER BY created_at DESC, id DESC",
            COLUMNS, clause, active
        );

        let conn = self.get_conn().await?;
        let rows = conn
            .query(&sql, params)
            .await
            .map_err(|e| CatalogError::Store(e.to_string()))?;
        Ok(rows.iter().map(row_to_item).collect())
    }
}

/// Escape LIKE/ILIKE metacharacters so a search term matches literally.
/// Postgres uses backslash as the default escape character.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn row_to_item(row: &Row) -> Item {
    Item {
        id: row.get(0),
        name: row.get(1),
        price: row.get(2),
        category: row.get(3),
        description: row.get(4),
        is_active: row.get(5),
        created_at: row.get(6),
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn find_all(&self) -> CatalogResult<Vec<Item>> {
        self.list_where("TRUE", &[], false).await
    }

    async fn find_by_id(&self, id: ItemId) -> CatalogResult<Option<Item>> {
        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!("SELECT {} FROM products WHERE id = $1", COLUMNS),
                &[&id],
            )
            .await
            .map_err(|e| CatalogError::Store(e.to_string()))?;
        Ok(row.as_ref().map(row_to_item))
    }

    async fn find_by_category(&self, category: &str) -> CatalogResult<Vec<Item>> {
        self.list_where("category = $1", &[&category], true).await
    }

    async fn search(&self, term: &str) -> CatalogResult<Vec<Item>> {
        // The term is a literal substring, not a LIKE pattern.
        let escaped = escape_like(term);
        self.list_where(
            "(name ILIKE '%' || $1 || '%' \
             OR description ILIKE '%' || $1 || '%' \
             OR category ILIKE '%' || $1 || '%')",
            &[&escaped],
            true,
        )
        .await
    }

    async fn insert(&self, draft: ItemDraft) -> CatalogResult<Item> {
        draft.validate()?;

        let id = new_item_id();
        let created_at = Utc::now();
        let conn = self.get_conn().await?;
        let row = conn
            .query_one(
                &format!(
                    "INSERT INTO products (id, name, price, category, description, is_active, created_at) \
                     VALUES ($1, $2, $3, $4, $5, TRUE, $6) RETURNING {}",
                    COLUMNS
                ),
                &[
                    &id,
                    &draft.name,
                    &draft.price,
                    &draft.category,
                    &draft.description,
                    &created_at,
                ],
            )
            .await
            .map_err(|e| CatalogError::Store(e.to_string()))?;
        Ok(row_to_item(&row))
    }

    async fn update(&self, id: ItemId, patch: ItemPatch) -> CatalogResult<Item> {
        patch.validate()?;

        let conn = self.get_conn().await?;
        let row = conn
            .query_opt(
                &format!(
                    "UPDATE products SET \
                       name = COALESCE($2, name), \
                       price = COALESCE($3, price), \
                       category = COALESCE($4, category), \
                       description = COALESCE($5, description) \
                     WHERE id = $1 AND is_active RETURNING {}",
                    COLUMNS
                ),
                &[&id, &patch.name, &patch.price, &patch.category, &patch.description],
            )
            .await
            .map_err(|e| CatalogError::Store(e.to_string()))?;

        row.as_ref().map(row_to_item).ok_or(CatalogError::NotFound(id))
    }

    async fn soft_delete(&self, id: ItemId) -> CatalogResult<()> {
        let conn = self.get_conn().await?;
        let affected = conn
            .execute(
                "UPDATE products SET is_active = FALSE WHERE id = $1 AND is_active",
                &[&id],
            )
            .await
            .map_err(|e| CatalogError::Store(e.to_string()))?;

        if affected == 0 {
            return Err(CatalogError::NotFound(id));
        }
        Ok(())
    }

    async fn ping(&self) -> CatalogResult<()> {
        let conn = self.get_conn().await?;
        conn.simple_query("SELECT 1")
            .await
            .map_err(|e| CatalogError::Store(e.to_string()))?;
        Ok(())
    }
}

// ============================================================================
// IN-MEMORY IMPLEMENTATION
// ============================================================================

/// Process-local record store for tests and dev mode.
#[derive(Default)]
pub struct MemoryRecordStore {
    items: RwLock<HashMap<ItemId, Item>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_err() -> CatalogError {
        CatalogError::Store("store lock poisoned".to_string())
    }

    /// Collect items matching `predicate`, newest first.
    fn collect<F>(&self, active_only: bool, predicate: F) -> CatalogResult<Vec<Item>>
    where
        F: Fn(&Item) -> bool,
    {
        let items = self.items.read().map_err(|_| Self::lock_err())?;
        let mut result: Vec<Item> = items
            .values()
            .filter(|i| !active_only || i.is_active)
            .filter(|i| predicate(i))
            .cloned()
            .collect();
        result.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(result)
    }
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(needle))
        .unwrap_or(false)
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn find_all(&self) -> CatalogResult<Vec<Item>> {
        self.collect(false, |_| true)
    }

    async fn find_by_id(&self, id: ItemId) -> CatalogResult<Option<Item>> {
        let items = self.items.read().map_err(|_| Self::lock_err())?;
        Ok(items.get(&id).cloned())
    }

    async fn find_by_category(&self, category: &str) -> CatalogResult<Vec<Item>> {
        self.collect(true, |i| i.category.as_deref() == Some(category))
    }

    async fn search(&self, term: &str) -> CatalogResult<Vec<Item>> {
        let needle = term.to_lowercase();
        self.collect(true, |i| {
            contains_ci(Some(&i.name), &needle)
                || contains_ci(i.description.as_deref(), &needle)
                || contains_ci(i.category.as_deref(), &needle)
        })
    }

    async fn insert(&self, draft: ItemDraft) -> CatalogResult<Item> {
        draft.validate()?;

        let item = Item {
            id: new_item_id(),
            name: draft.name,
            price: draft.price,
            category: draft.category,
            description: draft.description,
            is_active: true,
            created_at: Utc::now(),
        };

        let mut items = self.items.write().map_err(|_| Self::lock_err())?;
        items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update(&self, id: ItemId, patch: ItemPatch) -> CatalogResult<Item> {
        patch.validate()?;

        let mut items = self.items.write().map_err(|_| Self::lock_err())?;
        let item = items
            .get_mut(&id)
            .filter(|i| i.is_active)
            .ok_or(CatalogError::NotFound(id))?;

        if let Some(name) = patch.name {
            item.name = name;
        }
        if let Some(price) = patch.price {
            item.price = price;
        }
        if let Some(category) = patch.category {
            item.category = Some(category);
        }
        if let Some(description) = patch.description {
            item.description = Some(description);
        }
        Ok(item.clone())
    }

    async fn soft_delete(&self, id: ItemId) -> CatalogResult<()> {
        let mut items = self.items.write().map_err(|_| Self::lock_err())?;
        let item = items
            .get_mut(&id)
            .filter(|i| i.is_active)
            .ok_or(CatalogError::NotFound(id))?;
        item.is_active = false;
        Ok(())
    }

    async fn ping(&self) -> CatalogResult<()> {
        Ok(())
    }
}
