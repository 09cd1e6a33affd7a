//! Utility functions shared across the application.
//!
//! - [`content_disposition`] - download-filename header derivation

pub mod content_disposition;
