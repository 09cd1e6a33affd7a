#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use url_cache::application::services::{UrlCache, UrlResolver};
use url_cache::domain::{AddressSigner, ObjectStore, SigningError};
use url_cache::infrastructure::storage::MemoryStore;
use url_cache::state::AppState;

pub const TEST_BUCKET: &str = "test-bucket";

/// Signer that mimics the shape of a V4 signed URL without calling any
/// backend: deterministic query parameters, fixed fake signature.
pub struct FakeSigner;

#[async_trait]
impl AddressSigner for FakeSigner {
    async fn signed_url(&self, object: &str, ttl: Duration) -> Result<String, SigningError> {
        Ok(format!(
            "https://storage.googleapis.com/{TEST_BUCKET}/{object}?X-Goog-Expires={}&X-Goog-Signature=deadbeef",
            ttl.as_secs()
        ))
    }
}

/// Signer that always fails, for structural-error tests.
pub struct FailingSigner;

#[async_trait]
impl AddressSigner for FailingSigner {
    async fn signed_url(&self, _object: &str, _ttl: Duration) -> Result<String, SigningError> {
        Err(SigningError::Credential("no identity available".into()))
    }
}

/// Builds an application state over an in-memory store and a fake signer.
///
/// Returns the raw [`MemoryStore`] too so tests can seed and inspect it.
pub fn test_state(max_store_size: u64, sample_suffix: &str) -> (AppState, Arc<MemoryStore>) {
    test_state_with_signer(max_store_size, sample_suffix, Arc::new(FakeSigner))
}

pub fn test_state_with_signer(
    max_store_size: u64,
    sample_suffix: &str,
    signer: Arc<dyn AddressSigner>,
) -> (AppState, Arc<MemoryStore>) {
    let memory = Arc::new(MemoryStore::new());
    let store: Arc<dyn ObjectStore> = memory.clone();

    let cache = Arc::new(
        UrlCache::new(
            store.clone(),
            max_store_size,
            sample_suffix.to_string(),
            Duration::from_secs(2),
        )
        .unwrap(),
    );

    let resolver = Arc::new(UrlResolver::new(
        store.clone(),
        signer,
        TEST_BUCKET.to_string(),
    ));

    let state = AppState {
        cache,
        resolver,
        store,
        redirect_ttl: Duration::from_secs(10),
    };

    (state, memory)
}

/// Serves a router on an ephemeral local port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
