//! Object-store backends.
//!
//! Provides the concrete [`crate::domain::ObjectStore`] implementations:
//! - [`GcsStore`] - production Google Cloud Storage backend
//! - [`MemoryStore`] - in-process store for tests and local runs

mod gcs_store;
mod memory_store;

pub use gcs_store::GcsStore;
pub use memory_store::MemoryStore;
