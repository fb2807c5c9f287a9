//! Catalog Core - Entity Types
//!
//! Pure data structures with no behavior beyond field validation. All other
//! crates depend on this. This crate contains ONLY data types - no I/O.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Item identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation time.
pub type ItemId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 ItemId (timestamp-sortable).
pub fn new_item_id() -> ItemId {
    Uuid::now_v7()
}

// ============================================================================
// VALIDATION LIMITS
// ============================================================================

/// Maximum length of an item name.
pub const MAX_NAME_LEN: usize = 255;

// ============================================================================
// ENTITIES
// ============================================================================

/// A catalog item.
///
/// Items are never physically removed from the store. Deletion sets
/// `is_active` to false; inactive items are excluded from default scans and
/// searches but the row remains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Store-generated identifier, stable for the lifetime of the item.
    pub id: ItemId,
    /// Display name, 1..=255 characters.
    pub name: String,
    /// Catalog price, non-negative.
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Soft-delete flag. Defaults to true on insert.
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// Fields for inserting a new item. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ItemDraft {
    /// Validate field constraints: non-empty bounded name, non-negative price.
    pub fn validate(&self) -> CatalogResult<()> {
        validate_name(&self.name)?;
        validate_price(self.price)?;
        Ok(())
    }
}

/// Partial update for an existing item. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ItemPatch {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.description.is_none()
    }

    /// Validate whichever fields are present.
    pub fn validate(&self) -> CatalogResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> CatalogResult<()> {
    if name.trim().is_empty() {
        return Err(CatalogError::Validation("name must not be empty".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CatalogError::Validation(format!(
            "name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

fn validate_price(price: f64) -> CatalogResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(CatalogError::Validation(
            "price must be a non-negative number".into(),
        ));
    }
    Ok(())
}

// ============================================================================
// ERROR TAXONOMY
// ============================================================================

/// Errors produced by the record store and the coordination layer.
///
/// Cache transport failures are deliberately NOT part of this taxonomy: the
/// coordinator recovers them locally and they never reach a caller.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Input violated a field constraint, rejected before store involvement.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Point lookup on a missing or inactive id.
    #[error("item {0} not found")]
    NotFound(ItemId),

    /// Backing-store failure. Always surfaced to the caller, never swallowed.
    #[error("store error: {0}")]
    Store(String),
}

/// Result type alias used by store-facing operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
