//! Handler for the health check endpoint.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
    checks: HealthChecks,
}

#[derive(Serialize)]
struct HealthChecks {
    storage: CheckStatus,
}

#[derive(Serialize)]
struct CheckStatus {
    status: String,
    message: Option<String>,
}

/// Returns service health with a storage-backend reachability check.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: storage backend reachable
/// - **503 Service Unavailable**: storage backend unreachable
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let healthy = state.store.health_check().await;

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            storage: CheckStatus {
                status: if healthy { "ok" } else { "error" }.to_string(),
                message: Some(
                    if healthy {
                        "Storage backend reachable"
                    } else {
                        "Storage backend unreachable"
                    }
                    .to_string(),
                ),
            },
        },
    };

    if healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
