//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server
//! starts.
//!
//! ## Required Variables
//!
//! - `CACHE_BUCKET_NAME` - name of the bucket holding cached objects
//!
//! ## Optional Variables
//!
//! - `CACHE_MAX_STORE_SIZE` - largest Content-Length eligible for caching,
//!   in bytes (default: 5242880, i.e. 5 MiB)
//! - `CACHE_SAMPLE_SUFFIX` - hex suffix a URL's cache key must end with to
//!   be cached (default: `00`, a uniform 1-in-256 sampling rate; set empty
//!   to cache every URL)
//! - `CACHE_REDIRECT_TTL_SECONDS` - lifetime of signed addresses handed
//!   out by the redirect gateway (default: 10)
//! - `CACHE_FETCH_TIMEOUT_SECONDS` - bound on outbound HEAD/GET requests
//!   (default: 10)
//! - `STORAGE_EMULATOR_HOST` - storage endpoint override for emulators
//! - `LISTEN` - bind address (default: `0.0.0.0:3000`)
//! - `RUST_LOG` - log level (default: `info`)
//! - `LOG_FORMAT` - log format: `text` or `json` (default: `text`)

use anyhow::{Context, Result};
use std::env;

/// Signed addresses cannot outlive the 7-day backend limit.
const MAX_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bucket holding the cached objects.
    pub bucket_name: String,
    /// Largest Content-Length (bytes) the cache will store.
    pub max_store_size: u64,
    /// Sampling sentinel: hex suffix a cache key must end with. Empty
    /// disables sampling.
    pub sample_suffix: String,
    /// Lifetime in seconds of gateway-issued signed addresses.
    pub redirect_ttl_seconds: u64,
    /// Timeout in seconds for outbound HEAD/GET probes.
    pub fetch_timeout_seconds: u64,
    /// Storage endpoint override, for emulator-backed runs.
    pub storage_endpoint: Option<String>,
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `CACHE_BUCKET_NAME` is missing.
    pub fn from_env() -> Result<Self> {
        let bucket_name =
            env::var("CACHE_BUCKET_NAME").context("CACHE_BUCKET_NAME must be set")?;

        let max_store_size = env::var("CACHE_MAX_STORE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5 * 1024 * 1024);

        let sample_suffix =
            env::var("CACHE_SAMPLE_SUFFIX").unwrap_or_else(|_| "00".to_string());

        let redirect_ttl_seconds = env::var("CACHE_REDIRECT_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let fetch_timeout_seconds = env::var("CACHE_FETCH_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let storage_endpoint = env::var("STORAGE_EMULATOR_HOST").ok();

        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        Ok(Self {
            bucket_name,
            max_store_size,
            sample_suffix,
            redirect_ttl_seconds,
            fetch_timeout_seconds,
            storage_endpoint,
            listen_addr,
            log_level,
            log_format,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `bucket_name` is empty
    /// - `max_store_size` is zero
    /// - `sample_suffix` contains non-hex characters or is longer than a key
    /// - `redirect_ttl_seconds` is zero or above the 7-day signing limit
    /// - `fetch_timeout_seconds` is zero
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is not in `host:port` form
    pub fn validate(&self) -> Result<()> {
        if self.bucket_name.is_empty() {
            anyhow::bail!("CACHE_BUCKET_NAME must not be empty");
        }

        if self.max_store_size == 0 {
            anyhow::bail!("CACHE_MAX_STORE_SIZE must be greater than 0");
        }

        if self.sample_suffix.len() > 64
            || !self
                .sample_suffix
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
        {
            anyhow::bail!(
                "CACHE_SAMPLE_SUFFIX must be lowercase hex characters, got '{}'",
                self.sample_suffix
            );
        }

        if self.redirect_ttl_seconds == 0 || self.redirect_ttl_seconds > MAX_TTL_SECONDS {
            anyhow::bail!(
                "CACHE_REDIRECT_TTL_SECONDS must be between 1 and {}, got {}",
                MAX_TTL_SECONDS,
                self.redirect_ttl_seconds
            );
        }

        if self.fetch_timeout_seconds == 0 {
            anyhow::bail!("CACHE_FETCH_TIMEOUT_SECONDS must be greater than 0");
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        Ok(())
    }

    /// Prints configuration summary.
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Bucket: {}", self.bucket_name);
        tracing::info!("  Max store size: {} bytes", self.max_store_size);

        if self.sample_suffix.is_empty() {
            tracing::info!("  Sampling: disabled (all URLs eligible)");
        } else {
            tracing::info!(
                "  Sampling: 1 in {} (suffix '{}')",
                16u64.saturating_pow(self.sample_suffix.len() as u32),
                self.sample_suffix
            );
        }

        if let Some(ref endpoint) = self.storage_endpoint {
            tracing::info!("  Storage endpoint: {} (emulator)", endpoint);
        }

        tracing::info!("  Redirect TTL: {}s", self.redirect_ttl_seconds);
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if required variables are missing or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
