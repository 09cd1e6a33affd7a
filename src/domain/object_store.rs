//! Backend trait for the content-addressable object store.

use async_trait::async_trait;
use bytes::Bytes;

/// Errors raised by object-store backends.
///
/// These are structural failures (backend unreachable, unexpected status)
/// and always propagate to the caller; per-URL fetch problems never reach
/// this type.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Transport(String),

    #[error("storage backend returned status {status}: {message}")]
    Backend { status: u16, message: String },
}

impl From<reqwest::Error> for StorageError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Result type for object-store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value blob interface the cache is built on.
///
/// Objects are addressed by [`crate::domain::CacheKey`] strings and carry a
/// content-type and a content-disposition label alongside their bytes.
/// Implementations must be thread-safe; a single instance is shared across
/// all concurrent invocations.
///
/// # Implementations
///
/// - [`crate::infrastructure::storage::GcsStore`] - Google Cloud Storage JSON API
/// - [`crate::infrastructure::storage::MemoryStore`] - in-memory store for tests/local runs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Checks whether an object exists under `key`.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Retrieves the object's bytes, or `None` if absent.
    async fn get(&self, key: &str) -> StorageResult<Option<Bytes>>;

    /// Writes an object under `key`, overwriting any previous content.
    async fn put(
        &self,
        key: &str,
        content: Bytes,
        content_type: &str,
        content_disposition: &str,
    ) -> StorageResult<()>;

    /// Deletes the object under `key`. Deleting an absent object is a no-op.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Lists every object key in the store.
    async fn list(&self) -> StorageResult<Vec<String>>;

    /// Checks if the backend is reachable.
    ///
    /// Used by the health endpoint to report storage status.
    async fn health_check(&self) -> bool;
}
