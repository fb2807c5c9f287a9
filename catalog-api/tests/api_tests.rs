//! HTTP-level tests against the full router, using in-process backends.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use catalog_api::store::MemoryRecordStore;
use catalog_api::{create_app_router, ApiConfig, AppState};
use catalog_cache::MemoryCacheStore;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let state = AppState::new(
        Arc::new(MemoryRecordStore::new()),
        Arc::new(MemoryCacheStore::new()),
    );
    create_app_router(state, &ApiConfig::default())
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_ping_responds() {
    let response = app().oneshot(get("/health/ping")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn readiness_reports_components() {
    let response = app().oneshot(get("/health/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["details"]["database"]["status"], "healthy");
    assert_eq!(body["details"]["cache"]["status"], "healthy");
}

#[tokio::test]
async fn create_then_read_product() {
    let app = app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/products",
            json!({ "name": "Widget", "price": 9.99, "category": "tools" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = body_json(response).await;
    assert_eq!(created["data"]["name"], "Widget");
    assert_eq!(created["meta"]["cache_status"], "cache_cleared_and_updated");
    let id = created["data"]["id"].as_str().unwrap().to_string();

    // Point read is served from the cache entry written by create.
    let response = app
        .clone()
        .oneshot(get(&format!("/products/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let read = body_json(response).await;
    assert_eq!(read["meta"]["source"], "cache");
    assert_eq!(read["meta"]["cache_status"], "hit");
    assert_eq!(read["data"]["price"], 9.99);
}

#[tokio::test]
async fn list_carries_envelope_metadata() {
    let app = app();
    app.clone()
        .oneshot(json_request(
            "POST",
            "/products",
            json!({ "name": "Widget", "price": 9.99 }),
        ))
        .await
        .unwrap();

    let first = body_json(app.clone().oneshot(get("/products")).await.unwrap()).await;
    assert_eq!(first["meta"]["source"], "database");
    assert_eq!(first["meta"]["count"], 1);
    assert_eq!(first["meta"]["cached"], true);

    let second = body_json(app.clone().oneshot(get("/products")).await.unwrap()).await;
    assert_eq!(second["meta"]["source"], "cache");
    assert_eq!(second["meta"]["cache_status"], "hit");
}

#[tokio::test]
async fn create_rejects_missing_name() {
    let response = app()
        .oneshot(json_request(
            "POST",
            "/products",
            json!({ "name": "   ", "price": 9.99 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "MISSING_FIELD");
}

#[tokio::test]
async fn create_rejects_negative_price() {
    let response = app()
        .oneshot(json_request(
            "POST",
            "/products",
            json!({ "name": "Widget", "price": -1.0 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn update_rejects_empty_patch() {
    let app = app();
    let created = body_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/products",
                json!({ "name": "Widget", "price": 9.99 }),
            ))
            .await
            .unwrap(),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request("PUT", &format!("/products/{}", id), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_requires_query_term() {
    let response = app().oneshot(get("/products/search")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "MISSING_FIELD");
}

#[tokio::test]
async fn unknown_product_is_404() {
    let response = app()
        .oneshot(get("/products/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["code"], "ITEM_NOT_FOUND");
}

#[tokio::test]
async fn delete_returns_no_content_then_404() {
    let app = app();
    let created = body_json(
        app.clone()
            .oneshot(json_request(
                "POST",
                "/products",
                json!({ "name": "Widget", "price": 9.99 }),
            ))
            .await
            .unwrap(),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/products/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(get(&format!("/products/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn product_cache_clear_reports_count() {
    let app = app();
    app.clone()
        .oneshot(json_request(
            "POST",
            "/products",
            json!({ "name": "Widget", "price": 9.99 }),
        ))
        .await
        .unwrap();
    app.clone().oneshot(get("/products")).await.unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/products/cache")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["complete"], true);
    assert!(body["cleared"].as_u64().unwrap() >= 2);
}

#[tokio::test]
async fn cache_passthrough_roundtrip() {
    let app = app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/cache/set",
            json!({ "key": "debug:flag", "value": { "enabled": true } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/cache/get/debug:flag"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["value"]["enabled"], true);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/cache/del/debug:flag")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["deleted"], 1);

    let response = app
        .clone()
        .oneshot(get("/cache/get/debug:flag"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert!(body["value"].is_null());
}
