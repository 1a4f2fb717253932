//! HTTP integration tests
//!
//! Drive the full router with in-process requests. Host lookups go through a
//! fixed resolver so nothing here touches the network.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use seqlink::app::create_app;
use seqlink::config::RedirectMode;
use seqlink::models::UrlRecord;
use seqlink::registry::Registry;
use seqlink::storage::{MemoryStorage, SqliteStorage, Storage, StorageError, StorageResult};
use seqlink::validator::{StaticResolver, Validator};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn create_test_app(storage: Arc<dyn Storage>, redirect_status: RedirectMode) -> Router {
    let resolver = StaticResolver::new(["www.freecodecamp.org", "www.example.com"]);
    let validator = Arc::new(Validator::new(Arc::new(resolver), Duration::from_secs(1)));
    let registry = Arc::new(Registry::new(storage));
    create_app(registry, validator, redirect_status)
}

fn memory_app() -> Router {
    create_test_app(Arc::new(MemoryStorage::new()), RedirectMode::Found)
}

fn form_post(url: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/shorturl")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("url={}", form_encode(url))))
        .unwrap()
}

fn json_post(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/shorturl")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn form_encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_shorten_and_redirect_scenario() {
    let app = memory_app();

    let (status, body) = send(&app, form_post("https://www.freecodecamp.org")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"original_url": "https://www.freecodecamp.org", "short_url": 1})
    );

    let (_, body) = send(&app, form_post("https://www.example.com")).await;
    assert_eq!(body["short_url"], 2);

    let (_, body) = send(&app, form_post("https://www.freecodecamp.org")).await;
    assert_eq!(body["short_url"], 1);

    let response = app.clone().oneshot(get("/api/shorturl/2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://www.example.com"
    );

    let (status, body) = send(&app, get("/api/shorturl/3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "invalid url"}));
}

#[tokio::test]
async fn test_json_body_is_accepted() {
    let app = memory_app();

    let (status, body) = send(
        &app,
        json_post(json!({"url": "https://www.example.com/a?b=c"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["original_url"], "https://www.example.com/a?b=c");
    assert_eq!(body["short_url"], 1);
}

#[tokio::test]
async fn test_invalid_urls_collapse_to_one_error() {
    let app = memory_app();

    for candidate in [
        "",
        "www.example.com",
        "ftp://www.example.com",
        "https://this-host-does-not-exist.invalid",
    ] {
        let (status, body) = send(&app, form_post(candidate)).await;
        assert_eq!(status, StatusCode::OK, "candidate: {candidate:?}");
        assert_eq!(body, json!({"error": "invalid url"}), "candidate: {candidate:?}");
    }

    // Missing field and unparsable bodies
    let (_, body) = send(&app, json_post(json!({"link": "https://www.example.com"}))).await;
    assert_eq!(body, json!({"error": "invalid url"}));

    let request = Request::builder()
        .method("POST")
        .uri("/api/shorturl")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (_, body) = send(&app, request).await;
    assert_eq!(body, json!({"error": "invalid url"}));

    // Nothing was registered along the way
    let (_, body) = send(&app, form_post("https://www.example.com")).await;
    assert_eq!(body["short_url"], 1);
}

#[tokio::test]
async fn test_bad_identifiers() {
    let app = memory_app();
    send(&app, form_post("https://www.example.com")).await;

    for uri in [
        "/api/shorturl/abc",
        "/api/shorturl/0",
        "/api/shorturl/-1",
        "/api/shorturl/1abc",
        "/api/shorturl/999999",
        "/api/shorturl/%FF",
    ] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK, "uri: {uri}");
        assert_eq!(body, json!({"error": "invalid url"}), "uri: {uri}");
    }
}

#[tokio::test]
async fn test_redirect_escapes_control_bytes_in_location() {
    let app = memory_app();

    let (_, body) = send(&app, form_post("https://www.example.com/a\nb")).await;
    assert_eq!(body["original_url"], "https://www.example.com/a\nb");
    assert_eq!(body["short_url"], 1);

    let response = app.clone().oneshot(get("/api/shorturl/1")).await.unwrap();
    assert!(response.status().is_redirection(), "got {}", response.status());
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://www.example.com/a%0Ab"
    );

    // The stored record keeps the raw string
    let (_, body) = send(&app, form_post("https://www.example.com/a\nb")).await;
    assert_eq!(body["short_url"], 1);
}

#[tokio::test]
async fn test_redirect_status_is_configurable() {
    let app = create_test_app(Arc::new(MemoryStorage::new()), RedirectMode::Permanent);
    send(&app, form_post("https://www.example.com")).await;

    let response = app.oneshot(get("/api/shorturl/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
}

#[tokio::test]
async fn test_sqlite_backed_app() {
    let storage = SqliteStorage::new("sqlite::memory:", 5).await.unwrap();
    storage.init().await.unwrap();
    let app = create_test_app(Arc::new(storage), RedirectMode::Found);

    let (_, body) = send(&app, form_post("https://www.freecodecamp.org")).await;
    assert_eq!(body["short_url"], 1);

    let response = app.clone().oneshot(get("/api/shorturl/1")).await.unwrap();
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "https://www.freecodecamp.org"
    );
}

#[tokio::test]
async fn test_concurrent_same_url_requests() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let app = create_test_app(Arc::clone(&storage), RedirectMode::Found);

    let mut handles = vec![];
    for _ in 0..20 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            send(&app, form_post("https://www.freecodecamp.org")).await
        }));
    }

    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["short_url"], 1);
    }
    assert_eq!(storage.list(100, 0).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_health_and_index() {
    let app = memory_app();

    let (status, body) = send(&app, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Storage whose every operation fails, as a lost database connection would.
struct BrokenStorage;

#[async_trait::async_trait]
impl Storage for BrokenStorage {
    async fn init(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn insert_next(&self, _original_url: &str) -> StorageResult<UrlRecord> {
        Err(StorageError::Other(anyhow::anyhow!("connection lost")))
    }

    async fn get(&self, _id: i64) -> StorageResult<Option<UrlRecord>> {
        Err(StorageError::Other(anyhow::anyhow!("connection lost")))
    }

    async fn find_by_url(&self, _original_url: &str) -> StorageResult<Option<UrlRecord>> {
        Err(StorageError::Other(anyhow::anyhow!("connection lost")))
    }

    async fn max_id(&self) -> StorageResult<i64> {
        Err(StorageError::Other(anyhow::anyhow!("connection lost")))
    }

    async fn list(&self, _limit: i64, _offset: i64) -> StorageResult<Vec<UrlRecord>> {
        Err(StorageError::Other(anyhow::anyhow!("connection lost")))
    }
}

#[tokio::test]
async fn test_storage_failures_are_server_errors() {
    let app = create_test_app(Arc::new(BrokenStorage), RedirectMode::Found);

    let (status, body) = send(&app, form_post("https://www.example.com")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "server error"}));

    let (status, body) = send(&app, get("/api/shorturl/1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "server error"}));

    // Validation still runs first
    let (status, body) = send(&app, form_post("ftp://www.example.com")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "invalid url"}));
}
