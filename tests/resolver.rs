mod common;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use url_cache::domain::{CacheKey, ObjectStore};
use url_cache::prelude::UrlResolver;

use url_cache::infrastructure::storage::MemoryStore;

fn resolver_over_memory() -> (UrlResolver, Arc<MemoryStore>) {
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn ObjectStore> = memory.clone();

    let resolver = UrlResolver::new(
        store,
        Arc::new(common::FakeSigner),
        common::TEST_BUCKET.to_string(),
    );

    (resolver, memory)
}

#[tokio::test]
async fn test_durable_address_is_stable_across_calls() {
    let url = "https://example.com/artifacts/build.log";
    let (resolver, memory) = resolver_over_memory();
    memory
        .put(
            CacheKey::derive(url).as_str(),
            Bytes::from_static(b"log"),
            "text/plain",
            "attachment",
        )
        .await
        .unwrap();

    let first = resolver.resolve(url, None).await.unwrap().unwrap();
    let second = resolver.resolve(url, None).await.unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(
        first.url(),
        format!(
            "https://storage.googleapis.com/{}/{}",
            common::TEST_BUCKET,
            CacheKey::derive(url)
        )
    );
}

#[tokio::test]
async fn test_signed_address_carries_the_requested_ttl() {
    let url = "https://example.com/artifacts/build.log";
    let (resolver, memory) = resolver_over_memory();
    memory
        .put(
            CacheKey::derive(url).as_str(),
            Bytes::from_static(b"log"),
            "text/plain",
            "attachment",
        )
        .await
        .unwrap();

    let resolved = resolver
        .resolve(url, Some(Duration::from_secs(60)))
        .await
        .unwrap()
        .unwrap();

    assert!(resolved.url().contains("X-Goog-Expires=60"));
    assert!(resolved.url().contains(CacheKey::derive(url).as_str()));
}

#[tokio::test]
async fn test_absent_url_resolves_to_none() {
    let url = "https://example.com/never-stored";
    let (resolver, _memory) = resolver_over_memory();

    assert!(resolver.resolve(url, None).await.unwrap().is_none());
    assert!(
        resolver
            .resolve(url, Some(Duration::from_secs(60)))
            .await
            .unwrap()
            .is_none()
    );
}
