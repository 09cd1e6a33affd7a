//! HTTP request handlers.

pub mod health;
pub mod ingest;
pub mod redirect;

pub use health::health_handler;
pub use ingest::ingest_handler;
pub use redirect::redirect_handler;
