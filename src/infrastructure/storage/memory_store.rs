//! In-memory object store for tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{ObjectStore, StorageResult};

#[derive(Clone)]
struct StoredObject {
    content: Bytes,
    content_type: String,
    content_disposition: String,
}

/// Object store held entirely in process memory.
///
/// Implements the full [`ObjectStore`] contract without any external
/// backend. Used by the integration tests and by local runs where no
/// bucket is available.
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        debug!("Using MemoryStore (no storage backend configured)");
        Self::default()
    }

    /// Content-type stored for `key`, if present. Test helper.
    pub async fn content_type(&self, key: &str) -> Option<String> {
        let objects = self.objects.read().await;
        objects.get(key).map(|o| o.content_type.clone())
    }

    /// Content-disposition stored for `key`, if present. Test helper.
    pub async fn content_disposition(&self, key: &str) -> Option<String> {
        let objects = self.objects.read().await;
        objects.get(key).map(|o| o.content_disposition.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn get(&self, key: &str) -> StorageResult<Option<Bytes>> {
        Ok(self.objects.read().await.get(key).map(|o| o.content.clone()))
    }

    async fn put(
        &self,
        key: &str,
        content: Bytes,
        content_type: &str,
        content_disposition: &str,
    ) -> StorageResult<()> {
        self.objects.write().await.insert(
            key.to_string(),
            StoredObject {
                content,
                content_type: content_type.to_string(),
                content_disposition: content_disposition.to_string(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        Ok(self.objects.read().await.keys().cloned().collect())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = MemoryStore::new();
        store
            .put("k1", Bytes::from_static(b"hello"), "text/plain", "attachment")
            .await
            .unwrap();

        assert!(store.exists("k1").await.unwrap());
        assert_eq!(store.get("k1").await.unwrap().unwrap().as_ref(), b"hello");
        assert_eq!(store.content_type("k1").await.unwrap(), "text/plain");
    }

    #[tokio::test]
    async fn test_get_absent_is_none() {
        let store = MemoryStore::new();
        assert!(store.get("missing").await.unwrap().is_none());
        assert!(!store.exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_and_list() {
        let store = MemoryStore::new();
        store
            .put("a", Bytes::from_static(b"1"), "t", "d")
            .await
            .unwrap();
        store
            .put("b", Bytes::from_static(b"2"), "t", "d")
            .await
            .unwrap();

        let mut keys = store.list().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);

        store.delete("a").await.unwrap();
        assert!(!store.exists("a").await.unwrap());
        // Deleting an absent key is a no-op.
        store.delete("a").await.unwrap();
    }
}
