//! Raw Cache Passthrough Routes
//!
//! Direct key/value access to the cache backend, bypassing the coordinator.
//! Intended for debugging and operations, not application traffic. Unlike
//! the catalog paths, a cache failure here IS an error (503).

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use catalog_cache::CacheStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Default TTL for values written through the passthrough.
const PASSTHROUGH_TTL_SECS: u64 = 300;

// ============================================================================
// TYPES
// ============================================================================

/// Body of `POST /cache/set`.
#[derive(Debug, Deserialize)]
pub struct SetRequest {
    pub key: String,
    pub value: Value,
    /// TTL in seconds. Defaults to 300.
    pub ttl: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct GetResponse {
    pub key: String,
    /// `null` when the key is absent or expired.
    pub value: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: u64,
}

#[derive(Debug, Serialize)]
pub struct KeysResponse {
    pub keys: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct KeysParams {
    pub pattern: Option<String>,
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /cache/ping - Cache backend liveness.
pub async fn ping(State(cache): State<Arc<dyn CacheStore>>) -> ApiResult<impl IntoResponse> {
    cache.ping().await?;
    Ok("PONG")
}

/// POST /cache/set - Store an arbitrary JSON value.
pub async fn set(
    State(cache): State<Arc<dyn CacheStore>>,
    Json(req): Json<SetRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.key.trim().is_empty() {
        return Err(ApiError::missing_field("key"));
    }

    let ttl = Duration::from_secs(req.ttl.unwrap_or(PASSTHROUGH_TTL_SECS));
    let bytes = serde_json::to_vec(&req.value)?;
    cache.set_with_ttl(&req.key, bytes, ttl).await?;
    Ok(Json(serde_json::json!({ "key": req.key, "ok": true })))
}

/// GET /cache/get/{key} - Read a value. Absent keys return `value: null`.
pub async fn get_value(
    State(cache): State<Arc<dyn CacheStore>>,
    Path(key): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let value = match cache.get(&key).await? {
        Some(bytes) => Some(serde_json::from_slice(&bytes)?),
        None => None,
    };
    Ok(Json(GetResponse { key, value }))
}

/// DELETE /cache/del/{key} - Delete a single key.
pub async fn del(
    State(cache): State<Arc<dyn CacheStore>>,
    Path(key): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let deleted = cache.delete(&key).await?;
    Ok(Json(DeleteResponse { deleted }))
}

/// GET /cache/keys?pattern=... - Enumerate keys. Defaults to `*`.
pub async fn keys(
    State(cache): State<Arc<dyn CacheStore>>,
    Query(params): Query<KeysParams>,
) -> ApiResult<impl IntoResponse> {
    let pattern = params.pattern.as_deref().unwrap_or("*");
    let keys = cache.keys(pattern).await?;
    let count = keys.len();
    Ok(Json(KeysResponse { keys, count }))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/set", post(set))
        .route("/get/:key", get(get_value))
        .route("/del/:key", delete(del))
        .route("/keys", get(keys))
}
