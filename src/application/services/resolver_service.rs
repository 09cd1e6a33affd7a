//! URL resolution service: maps a URL to the address of its cached copy.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::{AddressSigner, CacheKey, ObjectStore, SigningError, StorageError};

/// Errors raised during resolution.
///
/// Both variants are structural (backend unreachable, signer
/// misconfigured) and propagate to the caller; a plain cache miss is not an
/// error.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Signing(#[from] SigningError),
}

/// Address of a cached object, computed on demand per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAddress {
    /// Permanent unsigned address; assumes the bucket is publicly readable.
    Durable(String),
    /// Time-bounded signed address.
    Signed {
        url: String,
        expires_at: DateTime<Utc>,
    },
}

impl ResolvedAddress {
    /// The address string, regardless of variant.
    pub fn url(&self) -> &str {
        match self {
            Self::Durable(url) => url,
            Self::Signed { url, .. } => url,
        }
    }
}

/// Read-only service resolving URLs to cached-copy addresses.
///
/// Only reads from the object store; the write path belongs exclusively to
/// [`crate::application::services::UrlCache`].
pub struct UrlResolver {
    store: Arc<dyn ObjectStore>,
    signer: Arc<dyn AddressSigner>,
    bucket_name: String,
}

impl UrlResolver {
    /// Creates a resolver over the given store and signer.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        signer: Arc<dyn AddressSigner>,
        bucket_name: String,
    ) -> Self {
        Self {
            store,
            signer,
            bucket_name,
        }
    }

    /// Resolves a URL to the address of its cached copy.
    ///
    /// Returns `Ok(None)` when the URL is not cached. Without a TTL the
    /// durable public-bucket address is returned; with a TTL a signed
    /// address valid for exactly that duration.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the storage backend is unreachable or
    /// signing fails. These indicate misconfiguration and are never
    /// swallowed.
    pub async fn resolve(
        &self,
        url: &str,
        ttl: Option<Duration>,
    ) -> Result<Option<ResolvedAddress>, ResolveError> {
        let key = CacheKey::derive(url);

        if !self.store.exists(key.as_str()).await? {
            return Ok(None);
        }

        match ttl {
            None => Ok(Some(ResolvedAddress::Durable(self.public_url(&key)))),
            Some(ttl) => {
                let signed = self.signer.signed_url(key.as_str(), ttl).await?;
                let expires_at = Utc::now()
                    + TimeDelta::from_std(ttl).map_err(|_| SigningError::InvalidTtl(ttl))?;
                Ok(Some(ResolvedAddress::Signed {
                    url: signed,
                    expires_at,
                }))
            }
        }
    }

    /// Durable public address of a cached object.
    ///
    /// A pure function of bucket name and key; no I/O.
    fn public_url(&self, key: &CacheKey) -> String {
        format!("https://storage.googleapis.com/{}/{}", self.bucket_name, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::object_store::MockObjectStore;
    use crate::domain::signing::MockAddressSigner;

    fn resolver(store: MockObjectStore, signer: MockAddressSigner) -> UrlResolver {
        UrlResolver::new(Arc::new(store), Arc::new(signer), "test-bucket".to_string())
    }

    #[tokio::test]
    async fn test_resolve_absent_url_returns_none() {
        let mut store = MockObjectStore::new();
        store.expect_exists().returning(|_| Ok(false));
        let mut signer = MockAddressSigner::new();
        signer.expect_signed_url().never();

        let r = resolver(store, signer);
        let resolved = r.resolve("https://example.com/missing", None).await.unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn test_resolve_without_ttl_is_durable_and_stable() {
        let url = "https://example.com/cached";
        let key = CacheKey::derive(url);

        let mut store = MockObjectStore::new();
        store.expect_exists().returning(|_| Ok(true));
        let signer = MockAddressSigner::new();

        let r = resolver(store, signer);
        let first = r.resolve(url, None).await.unwrap().unwrap();
        let second = r.resolve(url, None).await.unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(
            first.url(),
            format!("https://storage.googleapis.com/test-bucket/{key}")
        );
    }

    #[tokio::test]
    async fn test_resolve_with_ttl_delegates_to_signer() {
        let url = "https://example.com/cached";
        let key = CacheKey::derive(url);
        let key_check = key.clone();

        let mut store = MockObjectStore::new();
        store.expect_exists().returning(|_| Ok(true));
        let mut signer = MockAddressSigner::new();
        signer
            .expect_signed_url()
            .withf(move |object, ttl| object == key_check.as_str() && *ttl == Duration::from_secs(10))
            .returning(|object, _| Ok(format!("https://signed.example/{object}?X-Goog-Expires=10")));

        let r = resolver(store, signer);
        let resolved = r
            .resolve(url, Some(Duration::from_secs(10)))
            .await
            .unwrap()
            .unwrap();

        match resolved {
            ResolvedAddress::Signed { url, expires_at } => {
                assert!(url.contains("X-Goog-Expires=10"));
                assert!(expires_at > Utc::now());
            }
            other => panic!("expected signed address, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_signing_failure_propagates() {
        let mut store = MockObjectStore::new();
        store.expect_exists().returning(|_| Ok(true));
        let mut signer = MockAddressSigner::new();
        signer.expect_signed_url().returning(|_, _| {
            Err(SigningError::Credential("no identity configured".into()))
        });

        let r = resolver(store, signer);
        let result = r
            .resolve("https://example.com/cached", Some(Duration::from_secs(10)))
            .await;
        assert!(matches!(result, Err(ResolveError::Signing(_))));
    }
}
