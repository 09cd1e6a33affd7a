//! Trait seams for signing credentials and time-bounded object addresses.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Errors raised while obtaining credentials or signing addresses.
///
/// Signing failures indicate a misconfiguration (missing service identity,
/// unreachable signer backend) rather than a per-URL transient issue, so
/// they propagate instead of being swallowed.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("signing credential unavailable: {0}")]
    Credential(String),

    #[error("signing request failed: {0}")]
    Transport(String),

    #[error("signer backend returned status {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("signed URL TTL must be between 1 second and 7 days, got {0:?}")]
    InvalidTtl(Duration),
}

impl From<reqwest::Error> for SigningError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// The active service identity used to authorize storage calls and sign
/// addresses.
#[derive(Debug, Clone)]
pub struct SigningIdentity {
    /// Email/subject identifier of the identity.
    pub email: String,
    /// Bearer token for authenticated API calls.
    pub token: String,
    /// When the bearer token stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl SigningIdentity {
    /// Whether the bearer token has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Supplies the active signing identity, refreshing its bearer token when
/// absent or expired.
///
/// Implementations cache the identity and refresh it in place; refresh is
/// idempotent, so a shared instance is safe across concurrent invocations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns a currently-valid identity, refreshing first if needed.
    async fn signing_identity(&self) -> Result<SigningIdentity, SigningError>;
}

/// Produces time-bounded signed GET addresses for stored objects.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AddressSigner: Send + Sync {
    /// Returns a signed address for `object`, valid for exactly `ttl`.
    async fn signed_url(&self, object: &str, ttl: Duration) -> Result<String, SigningError>;
}
