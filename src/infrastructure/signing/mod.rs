//! Signed-address generation.

mod gcs_signer;

pub use gcs_signer::GcsV4Signer;
