//! Domain layer: cache-key derivation and the backend trait seams.
//!
//! This module holds the pure core of the cache (deterministic URL-to-key
//! mapping and the sampling decision) plus the traits the application layer
//! is written against, implemented by [`crate::infrastructure`]:
//!
//! - [`cache_key`] - URL hashing and sampling
//! - [`object_store`] - blob storage backend contract
//! - [`signing`] - credential and signed-address contracts
//!
//! The domain layer has no dependency on infrastructure or HTTP concerns.

pub mod cache_key;
pub mod object_store;
pub mod signing;

pub use cache_key::CacheKey;
pub use object_store::{ObjectStore, StorageError, StorageResult};
pub use signing::{AddressSigner, CredentialProvider, SigningError, SigningIdentity};
