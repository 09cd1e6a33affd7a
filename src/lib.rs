//! # URL Cache
//!
//! A caching redirect service for remote artifacts, backed by a
//! content-addressable object store.
//!
//! Candidate URLs arrive in queue-pushed batches and are conditionally
//! fetched and persisted under the SHA-256 hash of the URL; clients are
//! later redirected to the cached copy via short-lived signed addresses,
//! or transparently to the origin when nothing is cached.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer
//! separation:
//!
//! - **Domain Layer** ([`domain`]) - key derivation, sampling, and the
//!   storage/signing trait contracts
//! - **Application Layer** ([`application`]) - the cache store and URL
//!   resolver services
//! - **Infrastructure Layer** ([`infrastructure`]) - GCS, metadata-server
//!   credentials, V4 signing
//! - **API Layer** ([`api`]) - redirect gateway, ingestion endpoint,
//!   health check
//!
//! ## Features
//!
//! - Deterministic content addressing (one object per URL)
//! - Uniform hash-suffix sampling to bound ingestion cost
//! - Size-bounded two-phase fetch (HEAD probe before GET)
//! - Durable public or time-bounded signed cache addresses
//! - Transparent pass-through redirects for uncached URLs
//!
//! ## Quick Start
//!
//! ```bash
//! # Set required environment variables
//! export CACHE_BUCKET_NAME="artifact-cache"
//!
//! # Start the service
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via
//! [`config::Config`]. See the [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{StoreOutcome, UrlCache, UrlResolver};
    pub use crate::domain::{CacheKey, ObjectStore};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
