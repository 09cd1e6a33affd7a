//! Application layer services implementing the cache workflows.
//!
//! Services consume the domain traits and provide a clean API for HTTP
//! handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::cache_service::UrlCache`] - conditional fetch-and-persist, existence, retrieval, bulk empty
//! - [`services::resolver_service::UrlResolver`] - durable/signed address resolution

pub mod services;
