//! HTTP layer translating requests into cache operations.
//!
//! # Modules
//!
//! - [`handlers`] - redirect gateway, ingestion entry point, health check
//! - [`middleware`] - request tracing

pub mod handlers;
pub mod middleware;
