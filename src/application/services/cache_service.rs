//! URL caching service: the conditional fetch-and-persist workflow.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use tracing::{debug, info, warn};

use crate::domain::{CacheKey, ObjectStore, StorageResult};
use crate::utils::content_disposition::derive_content_disposition;

/// Fallback when neither the HEAD probe nor the GET response labels the
/// content.
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Outcome of a single [`UrlCache::store`] attempt.
///
/// `store` never fails; every path ends in one of these named outcomes so
/// callers and tests can distinguish what happened without log scraping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// Content was fetched and persisted.
    Stored,
    /// The URL's key missed the sampling suffix; no network access was made.
    SkippedSampling,
    /// An object already exists under the derived key.
    SkippedExisting,
    /// The probed Content-Length exceeds the configured maximum.
    SkippedTooLarge,
    /// The probe or fetch failed: transport error, non-200 status, missing
    /// Content-Length, or a storage-backend error while checking/writing.
    FailedFetch,
}

impl StoreOutcome {
    /// Stable label used for logging and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::SkippedSampling => "skipped_sampling",
            Self::SkippedExisting => "skipped_existing",
            Self::SkippedTooLarge => "skipped_too_large",
            Self::FailedFetch => "failed_fetch",
        }
    }
}

/// Service owning the write path of the URL cache.
///
/// Decides whether a URL is worth caching (sampling, existence, size
/// bound), performs the bounded two-phase HEAD/GET fetch, and persists the
/// result in the backing [`ObjectStore`]. Also exposes the read-side
/// existence/retrieval operations and the destructive bulk [`empty`]
/// operation.
///
/// [`empty`]: UrlCache::empty
pub struct UrlCache {
    store: Arc<dyn ObjectStore>,
    http: reqwest::Client,
    max_store_size: u64,
    sample_suffix: String,
}

impl UrlCache {
    /// Creates the cache service.
    ///
    /// # Arguments
    ///
    /// - `store` - backing object store
    /// - `max_store_size` - largest Content-Length (bytes) eligible for storage
    /// - `sample_suffix` - hex suffix a key must end with to be cached;
    ///   empty disables sampling
    /// - `fetch_timeout` - bound on each outbound HEAD/GET request
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        max_store_size: u64,
        sample_suffix: String,
        fetch_timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            store,
            http,
            max_store_size,
            sample_suffix,
        })
    }

    /// Attempts to store a URL's contents in the cache.
    ///
    /// Best-effort and infallible: all failures are logged and folded into
    /// a [`StoreOutcome`], so one bad URL can never abort a batch. At most
    /// one HEAD/GET pair and one object write are performed.
    pub async fn store(&self, url: &str) -> StoreOutcome {
        let outcome = self.try_store(url).await;
        metrics::counter!("urlcache_store_total", "outcome" => outcome.as_str()).increment(1);
        outcome
    }

    async fn try_store(&self, url: &str) -> StoreOutcome {
        let key = CacheKey::derive(url);

        if !key.matches_suffix(&self.sample_suffix) {
            debug!("URL {url:?} not sampled, not caching");
            return StoreOutcome::SkippedSampling;
        }

        match self.store.exists(key.as_str()).await {
            Ok(true) => {
                debug!("URL {url:?} already exists, not caching");
                return StoreOutcome::SkippedExisting;
            }
            Ok(false) => {}
            Err(e) => {
                warn!("Storage existence check failed for {url:?}: {e}");
                return StoreOutcome::FailedFetch;
            }
        }

        // Metadata-only probe before committing to a full download.
        let head = match self.http.head(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Error probing URL {url:?}: {e}");
                return StoreOutcome::FailedFetch;
            }
        };

        if head.status() != StatusCode::OK {
            warn!(
                "Failed to probe URL {url:?}. Status code: {}",
                head.status()
            );
            return StoreOutcome::FailedFetch;
        }

        let content_length = head
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let Some(content_length) = content_length else {
            warn!("No Content-Length for {url:?}, not caching");
            return StoreOutcome::FailedFetch;
        };

        if content_length > self.max_store_size {
            warn!(
                "URL {url:?} size ({content_length}) exceeds max_store_size ({}), not caching",
                self.max_store_size
            );
            return StoreOutcome::SkippedTooLarge;
        }

        let head_content_type = header_string(head.headers().get(CONTENT_TYPE));

        let response = match self.http.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Error downloading URL {url:?}: {e}");
                return StoreOutcome::FailedFetch;
            }
        };

        if response.status() != StatusCode::OK {
            warn!(
                "Failed to download URL {url:?}. Status code: {}",
                response.status()
            );
            return StoreOutcome::FailedFetch;
        }

        let content_type = head_content_type
            .or_else(|| header_string(response.headers().get(CONTENT_TYPE)))
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let disposition_header = header_string(response.headers().get(CONTENT_DISPOSITION));
        // The fetch may have been redirected; name the file after where it ended up.
        let final_url = response.url().clone();
        let content_disposition =
            derive_content_disposition(disposition_header.as_deref(), &final_url);

        let contents = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Error reading body of URL {url:?}: {e}");
                return StoreOutcome::FailedFetch;
            }
        };

        if let Err(e) = self
            .store
            .put(key.as_str(), contents, &content_type, &content_disposition)
            .await
        {
            warn!("Failed to persist URL {url:?}: {e}");
            return StoreOutcome::FailedFetch;
        }

        info!("URL {url:?} successfully cached");
        StoreOutcome::Stored
    }

    /// Checks if a URL is stored in the cache, without touching the origin.
    pub async fn is_stored(&self, url: &str) -> StorageResult<bool> {
        self.store.exists(CacheKey::derive(url).as_str()).await
    }

    /// Retrieves the cached contents of a URL, or `None` if not cached.
    ///
    /// Never fetches the origin.
    pub async fn fetch(&self, url: &str) -> StorageResult<Option<Bytes>> {
        self.store.get(CacheKey::derive(url).as_str()).await
    }

    /// Deletes every object in the backing store and returns the count.
    ///
    /// Destructive and unconditional at this layer; callers must gate
    /// access (the admin CLI prompts for confirmation).
    pub async fn empty(&self) -> StorageResult<usize> {
        let keys = self.store.list().await?;
        let mut deleted = 0usize;
        for key in keys {
            self.store.delete(&key).await?;
            deleted += 1;
        }
        info!("Cache emptied, {deleted} objects deleted");
        Ok(deleted)
    }
}

fn header_string(value: Option<&reqwest::header::HeaderValue>) -> Option<String> {
    value.and_then(|v| v.to_str().ok()).map(str::to_string)
}
