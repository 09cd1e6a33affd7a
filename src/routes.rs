//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /ingest`  - queue-push ingestion of candidate URLs
//! - `GET  /health`  - storage backend health check
//! - everything else - redirect gateway (the decoded query string is the URL)
//!
//! The gateway is mounted as the fallback so the service keeps the original
//! "any path" contract; only the two service-owned routes take precedence.
//!
//! # Middleware
//!
//! - **Tracing** - structured request/response logging
//! - **Path normalization** - trailing slash handling

use crate::api::handlers::{health_handler, ingest_handler, redirect_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/ingest", post(ingest_handler))
        .route("/health", get(health_handler))
        .fallback(redirect_handler)
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
