//! Product REST API Routes
//!
//! Axum route handlers for the product catalog. All reads and writes go
//! through the `CatalogCoordinator`, which owns the cache-aside behavior;
//! handlers only validate input and shape the HTTP response.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use catalog_core::{ItemDraft, ItemPatch};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    coordinator::CatalogCoordinator,
    error::{ApiError, ApiResult},
    state::AppState,
    types::{CreateItemRequest, UpdateItemRequest},
};

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /products - List all items, including inactive ones.
pub async fn list_products(
    State(catalog): State<CatalogCoordinator>,
) -> ApiResult<impl IntoResponse> {
    let response = catalog.list_items().await?;
    Ok(Json(response))
}

/// Query parameters for product search.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// GET /products/search?q=term - Search active items by free text.
pub async fn search_products(
    State(catalog): State<CatalogCoordinator>,
    Query(params): Query<SearchParams>,
) -> ApiResult<impl IntoResponse> {
    let term = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::missing_field("q"))?;

    let response = catalog.search_items(term).await?;
    Ok(Json(response))
}

/// GET /products/category/{category} - List active items in a category.
pub async fn products_by_category(
    State(catalog): State<CatalogCoordinator>,
    Path(category): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let response = catalog.items_by_category(&category).await?;
    Ok(Json(response))
}

/// GET /products/{id} - Get a single active item.
pub async fn get_product(
    State(catalog): State<CatalogCoordinator>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let response = catalog.get_item(id).await?;
    Ok(Json(response))
}

/// POST /products - Create a new item.
pub async fn create_product(
    State(catalog): State<CatalogCoordinator>,
    Json(req): Json<CreateItemRequest>,
) -> ApiResult<impl IntoResponse> {
    // Validate required fields
    if req.name.trim().is_empty() {
        return Err(ApiError::missing_field("name"));
    }

    let draft: ItemDraft = req.into();
    draft.validate()?;

    let response = catalog.create_item(draft).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /products/{id} - Patch an existing active item.
pub async fn update_product(
    State(catalog): State<CatalogCoordinator>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateItemRequest>,
) -> ApiResult<impl IntoResponse> {
    let patch: ItemPatch = req.into();
    if patch.is_empty() {
        return Err(ApiError::invalid_input(
            "update request must set at least one field",
        ));
    }
    patch.validate()?;

    let response = catalog.update_item(id, patch).await?;
    Ok(Json(response))
}

/// DELETE /products/{id} - Soft-delete an item.
pub async fn delete_product(
    State(catalog): State<CatalogCoordinator>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    catalog.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /products/cache - Clear every catalog cache entry.
pub async fn clear_product_cache(
    State(catalog): State<CatalogCoordinator>,
) -> ApiResult<impl IntoResponse> {
    let response = catalog.clear_cache().await;
    Ok(Json(response))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the products router. Static segments are registered alongside the
/// `/{id}` capture; Axum matches them first.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/cache", delete(clear_product_cache))
        .route("/search", get(search_products))
        .route("/category/:category", get(products_by_category))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}
