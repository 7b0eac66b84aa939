//! Integration Tests for the admin API
//!
//! Tests full request/response cycle for each endpoint against seeded stores.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use cachekeeper::{
    api::create_router,
    cache::{BoundedStore, SerializingStore, SharedStore, StoreConfig},
    keys::{document_key, search_key},
    tasks::{GuardianConfig, StaticProbe},
    AppState, CacheRegistry, MemoryGuardian,
};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Functions ==

struct TestApp {
    router: Router,
    documents: SharedStore<BoundedStore<String>>,
    searches: SharedStore<SerializingStore<Value>>,
}

fn create_test_app() -> TestApp {
    let mut registry = CacheRegistry::new();
    let documents = registry.create_store::<String>(
        "documents",
        StoreConfig::new(100, Duration::from_secs(300)),
    );
    let searches = registry.create_serializing_store::<Value>(
        "searches",
        StoreConfig::new(100, Duration::from_secs(300)),
    );
    let guardian =
        MemoryGuardian::with_probe(GuardianConfig::new(1_000), Arc::new(StaticProbe::new(10)));
    let state = AppState::new(Arc::new(registry), guardian, Duration::from_secs(3600));

    TestApp {
        router: create_router(state),
        documents,
        searches,
    }
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

// == Health and Stats ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

#[tokio::test]
async fn test_stats_reflect_store_contents() {
    let app = create_test_app();
    {
        let mut documents = app.documents.write().await;
        documents.set(document_key("users", "1"), "alice".to_string(), None);
        documents.set(document_key("users", "2"), "bob".to_string(), None);
        let _ = documents.get(&document_key("users", "1"));
    }
    app.searches.write().await.set(
        search_key("users", &json!({"name": "alice"})),
        &json!([{"id": 1}]),
        None,
    );

    let (status, json) = send(&app.router, "GET", "/stats", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_entries"], 3);
    assert_eq!(json["stores"][0]["name"], "documents");
    assert_eq!(json["stores"][0]["size"], 2);
    assert_eq!(json["stores"][0]["total_hits"], 1);
    assert_eq!(json["stores"][0]["max_size"], 100);
    assert_eq!(json["stores"][0]["fill_ratio"], 0.02);
    assert_eq!(json["stores"][1]["name"], "searches");
    assert_eq!(json["stores"][1]["size"], 1);
    assert_eq!(json["guardian"]["state"], "stopped");
}

// == Cleanup ==

#[tokio::test]
async fn test_cleanup_removes_expired_entries() {
    let app = create_test_app();
    {
        let mut documents = app.documents.write().await;
        documents.set("doc:a:1", "short".to_string(), Some(Duration::from_millis(20)));
        documents.set("doc:a:2", "long".to_string(), None);
    }
    tokio::time::sleep(Duration::from_millis(60)).await;

    let (status, json) = send(&app.router, "POST", "/cleanup", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_removed"], 1);
    assert_eq!(json["stores"][0]["removed"], 1);
    assert_eq!(json["stores"][1]["removed"], 0);
    assert_eq!(app.documents.read().await.keys(), vec!["doc:a:2".to_string()]);
}

// == Clear ==

#[tokio::test]
async fn test_clear_cache() {
    let app = create_test_app();
    app.documents
        .write()
        .await
        .set("doc:a:1", "x".to_string(), None);

    let (status, json) = send(&app.router, "DELETE", "/caches/documents", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "documents");
    assert_eq!(json["removed"], 1);
    assert!(app.documents.read().await.is_empty());
}

#[tokio::test]
async fn test_clear_unknown_cache() {
    let app = create_test_app();

    let (status, json) = send(&app.router, "DELETE", "/caches/nonexistent", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("nonexistent"));
}

// == Invalidate ==

#[tokio::test]
async fn test_invalidate_collection_prefix() {
    let app = create_test_app();
    {
        let mut documents = app.documents.write().await;
        documents.set(document_key("users", "1"), "alice".to_string(), None);
        documents.set(document_key("users", "2"), "bob".to_string(), None);
        documents.set(document_key("orders", "1"), "order".to_string(), None);
    }

    let (status, json) = send(
        &app.router,
        "POST",
        "/caches/documents/invalidate",
        Some(r#"{"prefix":"doc:users:"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["removed"], 2);
    assert_eq!(
        app.documents.read().await.keys(),
        vec![document_key("orders", "1")]
    );
}

#[tokio::test]
async fn test_invalidate_empty_prefix_rejected() {
    let app = create_test_app();

    let (status, json) = send(
        &app.router,
        "POST",
        "/caches/documents/invalidate",
        Some(r#"{"prefix":""}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_invalidate_unknown_cache() {
    let app = create_test_app();

    let (status, _) = send(
        &app.router,
        "POST",
        "/caches/nonexistent/invalidate",
        Some(r#"{"prefix":"doc:"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_test_app();

    let (status, _) = send(
        &app.router,
        "POST",
        "/caches/documents/invalidate",
        Some("not valid json"),
    )
    .await;

    assert!(status.is_client_error());
}

// == Guardian Lifecycle ==

#[tokio::test]
async fn test_guardian_lifecycle() {
    let app = create_test_app();

    let (status, json) = send(&app.router, "POST", "/guardian/start", Some("{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["changed"], true);
    assert_eq!(json["status"]["state"], "running");

    let (_, json) = send(
        &app.router,
        "POST",
        "/guardian/start",
        Some(r#"{"interval_secs":5}"#),
    )
    .await;
    assert_eq!(json["changed"], false);

    let (_, json) = send(&app.router, "GET", "/stats", None).await;
    assert_eq!(json["guardian"]["state"], "running");

    let (status, json) = send(&app.router, "POST", "/guardian/stop", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["changed"], true);
    assert_eq!(json["status"]["state"], "stopped");
}

#[tokio::test]
async fn test_guardian_zero_interval_rejected() {
    let app = create_test_app();

    let (status, _) = send(
        &app.router,
        "POST",
        "/guardian/start",
        Some(r#"{"interval_secs":0}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
