//! Credential providers for storage and signing calls.

use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::{CredentialProvider, SigningError, SigningIdentity};

/// Default GCE metadata server address.
const DEFAULT_METADATA_HOST: &str = "http://metadata.google.internal";

/// Refresh the token this long before its reported expiry to absorb clock
/// skew and in-flight latency.
const EXPIRY_SLACK_SECONDS: i64 = 60;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Credential provider backed by the instance metadata server.
///
/// The identity is fetched once and cached; [`signing_identity`] refreshes
/// it in place whenever the bearer token is absent or expired. Refresh is
/// idempotent, so a shared instance is safe under concurrent invocations;
/// the worst case is a redundant token fetch.
///
/// [`signing_identity`]: CredentialProvider::signing_identity
pub struct MetadataCredentials {
    http: reqwest::Client,
    host: String,
    cached: RwLock<Option<SigningIdentity>>,
}

impl MetadataCredentials {
    /// Creates a provider pointing at the default metadata server.
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_host(http, DEFAULT_METADATA_HOST.to_string())
    }

    /// Creates a provider with a custom metadata host (tests, emulators).
    pub fn with_host(http: reqwest::Client, host: String) -> Self {
        Self {
            http,
            host,
            cached: RwLock::new(None),
        }
    }

    async fn refresh(&self) -> Result<SigningIdentity, SigningError> {
        let base = format!(
            "{}/computeMetadata/v1/instance/service-accounts/default",
            self.host
        );

        let token: TokenResponse = self
            .http
            .get(format!("{base}/token"))
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| SigningError::Credential(e.to_string()))?
            .error_for_status()
            .map_err(|e| SigningError::Credential(e.to_string()))?
            .json()
            .await
            .map_err(|e| SigningError::Credential(e.to_string()))?;

        let email = self
            .http
            .get(format!("{base}/email"))
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| SigningError::Credential(e.to_string()))?
            .error_for_status()
            .map_err(|e| SigningError::Credential(e.to_string()))?
            .text()
            .await
            .map_err(|e| SigningError::Credential(e.to_string()))?;

        let expires_at =
            Utc::now() + TimeDelta::seconds((token.expires_in - EXPIRY_SLACK_SECONDS).max(0));

        let identity = SigningIdentity {
            email: email.trim().to_string(),
            token: token.access_token,
            expires_at,
        };

        info!(
            "Refreshed signing identity {} (valid until {})",
            identity.email, identity.expires_at
        );

        let mut cached = self.cached.write().await;
        *cached = Some(identity.clone());
        Ok(identity)
    }
}

#[async_trait]
impl CredentialProvider for MetadataCredentials {
    async fn signing_identity(&self) -> Result<SigningIdentity, SigningError> {
        {
            let cached = self.cached.read().await;
            if let Some(identity) = cached.as_ref()
                && !identity.is_expired()
            {
                return Ok(identity.clone());
            }
        }

        debug!("Signing token absent or expired, refreshing");
        self.refresh().await
    }
}

/// Fixed-identity provider for tests and emulator runs.
pub struct StaticCredentials {
    identity: SigningIdentity,
}

impl StaticCredentials {
    /// Creates a provider that always returns the given identity.
    pub fn new(identity: SigningIdentity) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentials {
    async fn signing_identity(&self) -> Result<SigningIdentity, SigningError> {
        Ok(self.identity.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_credentials_return_the_identity() {
        let provider = StaticCredentials::new(SigningIdentity {
            email: "svc@test.iam.gserviceaccount.com".to_string(),
            token: "token-value".to_string(),
            expires_at: Utc::now() + TimeDelta::hours(1),
        });

        let identity = provider.signing_identity().await.unwrap();
        assert_eq!(identity.email, "svc@test.iam.gserviceaccount.com");
        assert_eq!(identity.token, "token-value");
        assert!(!identity.is_expired());
    }

    #[test]
    fn test_expired_identity_is_detected() {
        let identity = SigningIdentity {
            email: "svc@test".to_string(),
            token: "t".to_string(),
            expires_at: Utc::now() - TimeDelta::seconds(1),
        };
        assert!(identity.is_expired());
    }
}
