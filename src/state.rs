//! Shared application state injected into HTTP handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{UrlCache, UrlResolver};
use crate::domain::ObjectStore;

/// Per-process service handles, created once in [`crate::server::run`] and
/// cloned into every handler invocation.
#[derive(Clone)]
pub struct AppState {
    /// Write path of the cache (ingestion).
    pub cache: Arc<UrlCache>,
    /// Read path of the cache (redirect gateway).
    pub resolver: Arc<UrlResolver>,
    /// Backing store handle, used directly only by the health endpoint.
    pub store: Arc<dyn ObjectStore>,
    /// Lifetime of the signed addresses handed out by the redirect gateway.
    pub redirect_ttl: Duration,
}
