//! V4 signed URLs for GCS objects.
//!
//! Builds the `GOOG4-RSA-SHA256` canonical request for a GET on the cached
//! object and has the IAM credentials API (`signBlob`) produce the RSA
//! signature on behalf of the active service identity, authorized by its
//! bearer token. No private key material is ever held in process.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::domain::{AddressSigner, CredentialProvider, SigningError};

const DEFAULT_IAM_ENDPOINT: &str = "https://iamcredentials.googleapis.com";
const STORAGE_HOST: &str = "storage.googleapis.com";
const ALGORITHM: &str = "GOOG4-RSA-SHA256";

/// GCS caps signed-URL lifetimes at 7 days.
const MAX_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// RFC 3986 strict query encoding: everything but unreserved characters.
const QUERY_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignBlobResponse {
    signed_blob: String,
}

/// Signer producing V4 signed GET URLs via the IAM `signBlob` API.
pub struct GcsV4Signer {
    http: reqwest::Client,
    credentials: Arc<dyn CredentialProvider>,
    bucket_name: String,
    iam_endpoint: String,
}

impl GcsV4Signer {
    /// Creates a signer against the production IAM endpoint.
    pub fn new(
        http: reqwest::Client,
        credentials: Arc<dyn CredentialProvider>,
        bucket_name: String,
    ) -> Self {
        Self::with_endpoint(
            http,
            credentials,
            bucket_name,
            DEFAULT_IAM_ENDPOINT.to_string(),
        )
    }

    /// Creates a signer with a custom IAM endpoint (tests).
    pub fn with_endpoint(
        http: reqwest::Client,
        credentials: Arc<dyn CredentialProvider>,
        bucket_name: String,
        iam_endpoint: String,
    ) -> Self {
        Self {
            http,
            credentials,
            bucket_name,
            iam_endpoint: iam_endpoint.trim_end_matches('/').to_string(),
        }
    }

    async fn sign_blob(&self, email: &str, token: &str, payload: &[u8]) -> Result<Vec<u8>, SigningError> {
        let url = format!(
            "{}/v1/projects/-/serviceAccounts/{}:signBlob",
            self.iam_endpoint, email
        );

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "payload": BASE64.encode(payload) }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(SigningError::Backend { status, message });
        }

        let body: SignBlobResponse = response
            .json()
            .await
            .map_err(|e| SigningError::Transport(e.to_string()))?;

        BASE64
            .decode(&body.signed_blob)
            .map_err(|e| SigningError::Backend {
                status: 200,
                message: format!("invalid signedBlob encoding: {e}"),
            })
    }
}

#[async_trait]
impl AddressSigner for GcsV4Signer {
    async fn signed_url(&self, object: &str, ttl: Duration) -> Result<String, SigningError> {
        if ttl.as_secs() == 0 || ttl.as_secs() > MAX_TTL_SECONDS {
            return Err(SigningError::InvalidTtl(ttl));
        }

        let identity = self.credentials.signing_identity().await?;
        let now = Utc::now();

        let query = unsigned_query(&identity.email, now, ttl.as_secs());
        let to_sign = string_to_sign(&canonical_request(&self.bucket_name, object, &query), now);

        let signature = self
            .sign_blob(&identity.email, &identity.token, to_sign.as_bytes())
            .await?;

        Ok(format!(
            "https://{STORAGE_HOST}/{}/{object}?{query}&X-Goog-Signature={}",
            self.bucket_name,
            hex::encode(signature)
        ))
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_ENCODE).to_string()
}

/// `YYYYMMDD/auto/storage/goog4_request` scope for the request date.
fn credential_scope(at: DateTime<Utc>) -> String {
    format!("{}/auto/storage/goog4_request", at.format("%Y%m%d"))
}

/// Canonical query string, parameters in lexicographic order, without the
/// signature itself.
fn unsigned_query(email: &str, at: DateTime<Utc>, expires_seconds: u64) -> String {
    let credential = format!("{email}/{}", credential_scope(at));
    format!(
        "X-Goog-Algorithm={ALGORITHM}\
         &X-Goog-Credential={}\
         &X-Goog-Date={}\
         &X-Goog-Expires={expires_seconds}\
         &X-Goog-SignedHeaders=host",
        encode(&credential),
        at.format("%Y%m%dT%H%M%SZ"),
    )
}

fn canonical_request(bucket: &str, object: &str, query: &str) -> String {
    format!(
        "GET\n/{bucket}/{object}\n{query}\nhost:{STORAGE_HOST}\n\nhost\nUNSIGNED-PAYLOAD"
    )
}

fn string_to_sign(canonical_request: &str, at: DateTime<Utc>) -> String {
    let digest = hex::encode(Sha256::digest(canonical_request.as_bytes()));
    format!(
        "{ALGORITHM}\n{}\n{}\n{digest}",
        at.format("%Y%m%dT%H%M%SZ"),
        credential_scope(at)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_credential_scope_format() {
        assert_eq!(credential_scope(at()), "20240115/auto/storage/goog4_request");
    }

    #[test]
    fn test_unsigned_query_is_deterministic_and_ordered() {
        let query = unsigned_query("svc@proj.iam.gserviceaccount.com", at(), 10);
        assert_eq!(
            query,
            "X-Goog-Algorithm=GOOG4-RSA-SHA256\
             &X-Goog-Credential=svc%40proj.iam.gserviceaccount.com%2F20240115%2Fauto%2Fstorage%2Fgoog4_request\
             &X-Goog-Date=20240115T123000Z\
             &X-Goog-Expires=10\
             &X-Goog-SignedHeaders=host"
        );
    }

    #[test]
    fn test_canonical_request_shape() {
        let query = unsigned_query("svc@proj", at(), 10);
        let request = canonical_request("bucket", "abc123", &query);
        let lines: Vec<&str> = request.split('\n').collect();

        assert_eq!(lines[0], "GET");
        assert_eq!(lines[1], "/bucket/abc123");
        assert_eq!(lines[2], query);
        assert_eq!(lines[3], "host:storage.googleapis.com");
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "host");
        assert_eq!(lines[6], "UNSIGNED-PAYLOAD");
    }

    #[test]
    fn test_string_to_sign_embeds_request_digest() {
        let request = canonical_request("bucket", "abc123", "q=1");
        let to_sign = string_to_sign(&request, at());
        let lines: Vec<&str> = to_sign.split('\n').collect();

        assert_eq!(lines[0], "GOOG4-RSA-SHA256");
        assert_eq!(lines[1], "20240115T123000Z");
        assert_eq!(lines[2], "20240115/auto/storage/goog4_request");
        assert_eq!(lines[3], hex::encode(Sha256::digest(request.as_bytes())));
    }

    #[test]
    fn test_strings_to_sign_differ_across_times() {
        let request = canonical_request("bucket", "abc123", "q=1");
        let later = at() + chrono::TimeDelta::seconds(1);
        assert_ne!(string_to_sign(&request, at()), string_to_sign(&request, later));
    }
}
