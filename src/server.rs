//! HTTP server initialization and runtime setup.
//!
//! Wires the storage, credential and signing services together and runs the
//! Axum server. All service handles are constructed here exactly once and
//! injected through [`AppState`]; there is no global state.

use crate::application::services::{UrlCache, UrlResolver};
use crate::config::Config;
use crate::domain::{AddressSigner, CredentialProvider, ObjectStore};
use crate::infrastructure::credentials::MetadataCredentials;
use crate::infrastructure::signing::GcsV4Signer;
use crate::infrastructure::storage::GcsStore;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Bound on storage/credential API calls, distinct from the origin fetch
/// timeout which is configured per deployment.
const BACKEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the HTTP server with the given configuration.
///
/// Initializes, in order:
/// - the shared backend HTTP client
/// - the metadata-server credential provider
/// - the object store (GCS, or an emulator endpoint if configured)
/// - the V4 address signer
/// - the cache and resolver services
/// - the Axum HTTP server with graceful ctrl-c shutdown
///
/// # Errors
///
/// Returns an error if a client cannot be constructed, the bind fails, or
/// the server errors at runtime.
pub async fn run(config: Config) -> Result<()> {
    let http = reqwest::Client::builder().timeout(BACKEND_TIMEOUT).build()?;

    let credentials: Arc<dyn CredentialProvider> =
        Arc::new(MetadataCredentials::new(http.clone()));

    let store: Arc<dyn ObjectStore> = match &config.storage_endpoint {
        Some(endpoint) => Arc::new(GcsStore::with_endpoint(
            http.clone(),
            credentials.clone(),
            config.bucket_name.clone(),
            endpoint.clone(),
        )),
        None => Arc::new(GcsStore::new(
            http.clone(),
            credentials.clone(),
            config.bucket_name.clone(),
        )),
    };

    let signer: Arc<dyn AddressSigner> = Arc::new(GcsV4Signer::new(
        http,
        credentials,
        config.bucket_name.clone(),
    ));

    let cache = Arc::new(UrlCache::new(
        store.clone(),
        config.max_store_size,
        config.sample_suffix.clone(),
        Duration::from_secs(config.fetch_timeout_seconds),
    )?);

    let resolver = Arc::new(UrlResolver::new(
        store.clone(),
        signer,
        config.bucket_name.clone(),
    ));

    let state = AppState {
        cache,
        resolver,
        store,
        redirect_ttl: Duration::from_secs(config.redirect_ttl_seconds),
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutdown signal received");
    }
}
