//! Google Cloud Storage implementation of the object store.
//!
//! Talks to the GCS JSON API directly over `reqwest`, authorized by the
//! bearer token of the active [`CredentialProvider`] identity. The endpoint
//! is overridable for emulator-backed runs.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::domain::{CredentialProvider, ObjectStore, StorageError, StorageResult};

/// Production GCS endpoint.
const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectList {
    #[serde(default)]
    items: Vec<ObjectMeta>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct ObjectMeta {
    name: String,
}

/// GCS-backed object store.
pub struct GcsStore {
    http: reqwest::Client,
    credentials: Arc<dyn CredentialProvider>,
    bucket_name: String,
    endpoint: String,
}

impl GcsStore {
    /// Creates a store against the production GCS endpoint.
    pub fn new(
        http: reqwest::Client,
        credentials: Arc<dyn CredentialProvider>,
        bucket_name: String,
    ) -> Self {
        Self::with_endpoint(http, credentials, bucket_name, DEFAULT_ENDPOINT.to_string())
    }

    /// Creates a store against a custom endpoint (emulator, tests).
    pub fn with_endpoint(
        http: reqwest::Client,
        credentials: Arc<dyn CredentialProvider>,
        bucket_name: String,
        endpoint: String,
    ) -> Self {
        Self {
            http,
            credentials,
            bucket_name,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    async fn bearer_token(&self) -> StorageResult<String> {
        self.credentials
            .signing_identity()
            .await
            .map(|identity| identity.token)
            .map_err(|e| StorageError::Transport(format!("credential error: {e}")))
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/b/{}/o/{}",
            self.endpoint,
            self.bucket_name,
            utf8_percent_encode(key, NON_ALPHANUMERIC)
        )
    }

    async fn backend_error(response: reqwest::Response) -> StorageError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        StorageError::Backend { status, message }
    }
}

#[async_trait]
impl ObjectStore for GcsStore {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let token = self.bearer_token().await?;
        let response = self
            .http
            .get(self.object_url(key))
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(Self::backend_error(response).await),
        }
    }

    async fn get(&self, key: &str) -> StorageResult<Option<Bytes>> {
        let token = self.bearer_token().await?;
        let response = self
            .http
            .get(format!("{}?alt=media", self.object_url(key)))
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.bytes().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(Self::backend_error(response).await),
        }
    }

    async fn put(
        &self,
        key: &str,
        content: Bytes,
        content_type: &str,
        content_disposition: &str,
    ) -> StorageResult<()> {
        let token = self.bearer_token().await?;

        // Media upload first, then a metadata patch for the disposition.
        let upload_url = format!(
            "{}/upload/storage/v1/b/{}/o?uploadType=media&name={}",
            self.endpoint,
            self.bucket_name,
            utf8_percent_encode(key, NON_ALPHANUMERIC)
        );

        let response = self
            .http
            .post(upload_url)
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(content)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::backend_error(response).await);
        }

        let response = self
            .http
            .patch(self.object_url(key))
            .bearer_auth(token)
            .json(&json!({ "contentDisposition": content_disposition }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::backend_error(response).await);
        }

        debug!("Stored object {key} ({content_type})");
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let token = self.bearer_token().await?;
        let response = self
            .http
            .delete(self.object_url(key))
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Ok(()),
            _ => Err(Self::backend_error(response).await),
        }
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let token = self.bearer_token().await?;
            let mut request = self
                .http
                .get(format!(
                    "{}/storage/v1/b/{}/o",
                    self.endpoint, self.bucket_name
                ))
                .bearer_auth(token)
                .query(&[("fields", "items/name,nextPageToken")]);

            if let Some(ref page) = page_token {
                request = request.query(&[("pageToken", page.as_str())]);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(Self::backend_error(response).await);
            }

            let page: ObjectList = response
                .json()
                .await
                .map_err(|e| StorageError::Transport(e.to_string()))?;

            keys.extend(page.items.into_iter().map(|o| o.name));

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(keys)
    }

    async fn health_check(&self) -> bool {
        let Ok(token) = self.bearer_token().await else {
            return false;
        };

        self.http
            .get(format!(
                "{}/storage/v1/b/{}",
                self.endpoint, self.bucket_name
            ))
            .bearer_auth(token)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}
