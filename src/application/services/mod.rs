//! Business logic services for the application layer.

pub mod cache_service;
pub mod resolver_service;

pub use cache_service::{StoreOutcome, UrlCache};
pub use resolver_service::{ResolveError, ResolvedAddress, UrlResolver};
