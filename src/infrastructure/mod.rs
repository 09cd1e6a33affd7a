//! Infrastructure layer for external integrations.
//!
//! Implements the trait seams defined by the domain layer:
//!
//! - [`storage`] - object-store backends (GCS JSON API, in-memory)
//! - [`credentials`] - signing-identity providers (metadata server, static)
//! - [`signing`] - V4 signed-URL generation via the IAM credentials API

pub mod credentials;
pub mod signing;
pub mod storage;
