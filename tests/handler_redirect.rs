mod common;

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use bytes::Bytes;
use url_cache::api::handlers::redirect_handler;
use url_cache::domain::{CacheKey, ObjectStore};

fn gateway(state: url_cache::AppState) -> TestServer {
    let app = Router::new().fallback(redirect_handler).with_state(state);
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_empty_query_is_bad_request() {
    let (state, _memory) = common::test_state(1024, "");
    let server = gateway(state);

    let response = server.get("/").await;

    response.assert_status_bad_request();
    assert!(response.text().contains("valid URL"));
}

#[tokio::test]
async fn test_non_get_method_is_rejected_on_any_path() {
    let (state, _memory) = common::test_state(1024, "");
    let server = gateway(state);

    let response = server.post("/").await;
    assert_eq!(response.status_code(), 405);
    assert_eq!(response.header("allow"), "GET");

    let response = server.post("/some/other/path").await;
    assert_eq!(response.status_code(), 405);
    assert_eq!(response.header("allow"), "GET");
}

#[tokio::test]
async fn test_uncached_url_redirects_to_origin() {
    let (state, _memory) = common::test_state(1024, "");
    let server = gateway(state);

    let response = server.get("/?https%3A%2F%2Fexample.com%2Fbuild.log").await;

    assert_eq!(response.status_code(), 302);
    assert_eq!(response.header("location"), "https://example.com/build.log");
}

#[tokio::test]
async fn test_cached_url_redirects_to_signed_address() {
    let url = "https://example.com/build.log";
    let key = CacheKey::derive(url);

    let (state, memory) = common::test_state(1024, "");
    memory
        .put(key.as_str(), Bytes::from_static(b"log"), "text/plain", "attachment")
        .await
        .unwrap();

    let server = gateway(state);
    let response = server.get("/?https%3A%2F%2Fexample.com%2Fbuild.log").await;

    assert_eq!(response.status_code(), 302);
    let location = response.header("location");
    let location = location.to_str().unwrap();

    assert_ne!(location, url);
    assert_eq!(
        location,
        format!(
            "https://storage.googleapis.com/{}/{key}?X-Goog-Expires=10&X-Goog-Signature=deadbeef",
            common::TEST_BUCKET
        )
    );
}

#[tokio::test]
async fn test_structural_resolver_failure_is_a_server_error() {
    let url = "https://example.com/build.log";
    let key = CacheKey::derive(url);

    let (state, memory) =
        common::test_state_with_signer(1024, "", Arc::new(common::FailingSigner));
    memory
        .put(key.as_str(), Bytes::from_static(b"log"), "text/plain", "attachment")
        .await
        .unwrap();

    let server = gateway(state);
    let response = server.get("/?https%3A%2F%2Fexample.com%2Fbuild.log").await;

    assert_eq!(response.status_code(), 500);
    // Short sentence, no internal detail leaked.
    assert!(!response.text().contains("identity"));
}
