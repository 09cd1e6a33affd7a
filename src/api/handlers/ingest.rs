//! Handler for the queue-triggered URL ingestion entry point.

use axum::{Json, extract::State, http::StatusCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::application::services::StoreOutcome;
use crate::error::AppError;
use crate::state::AppState;

/// Pub/Sub push delivery envelope.
#[derive(Deserialize)]
pub struct PushEnvelope {
    message: PushMessage,
}

#[derive(Deserialize)]
struct PushMessage {
    /// Base64-encoded, newline-separated UTF-8 URL strings.
    data: String,
}

/// Caches each URL carried by a pushed queue message.
///
/// # Endpoint
///
/// `POST /ingest`
///
/// # Request Flow
///
/// 1. Decode the base64 message data into newline-separated URLs
/// 2. Pass each non-empty line to the cache store, sequentially
/// 3. Respond 204 once the whole batch has been attempted
///
/// Individual store attempts never fail the batch; their outcomes are
/// tallied and logged. Acknowledgement of the queue message is the
/// pushing framework's concern, signalled by the 2xx response.
///
/// # Errors
///
/// Returns 400 for a malformed envelope or invalid base64 - redelivery
/// could never make such a message processable.
pub async fn ingest_handler(
    State(state): State<AppState>,
    Json(envelope): Json<PushEnvelope>,
) -> Result<StatusCode, AppError> {
    let decoded = BASE64
        .decode(envelope.message.data.as_bytes())
        .map_err(|e| {
            AppError::bad_request("Message data is not valid base64", json!({ "reason": e.to_string() }))
        })?;
    let batch = String::from_utf8_lossy(&decoded);

    let mut attempted = 0usize;
    let mut stored = 0usize;
    for url in batch.lines().filter(|line| !line.is_empty()) {
        attempted += 1;
        if state.cache.store(url).await == StoreOutcome::Stored {
            stored += 1;
        }
    }

    info!("Ingested batch: {stored}/{attempted} URLs stored");
    Ok(StatusCode::NO_CONTENT)
}
