//! Handler for cache redirection.

use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;
use tracing::{debug, error, info};

use crate::state::AppState;

/// Redirects a client to the cached copy of a URL, or to the origin.
///
/// # Endpoint
///
/// `GET /?<percent-encoded-url>` - the entire decoded query string is the
/// candidate URL; there is no parameter name. Mounted as the router
/// fallback too, so every path not owned by the service behaves the same.
///
/// # Request Flow
///
/// 1. Non-GET methods are rejected with 405 and an `Allow: GET` header
/// 2. Empty query after percent-decoding is rejected with 400
/// 3. The resolver is asked for a short-lived signed address
/// 4. Cached: 302 with `Location` set to the signed address
/// 5. Not cached: 302 with `Location` set to the original URL, so the
///    gateway degrades to a transparent pass-through redirector
///
/// # Errors
///
/// A structural resolver failure (credentials, storage backend) surfaces
/// as a 500 with a short plain-text body rather than silently redirecting
/// to the origin.
pub async fn redirect_handler(
    State(state): State<AppState>,
    method: Method,
    RawQuery(query): RawQuery,
) -> Response {
    if method != Method::GET {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "GET")],
            "Method not allowed.",
        )
            .into_response();
    }

    let raw = query.unwrap_or_default();
    let url_to_fetch = percent_decode_str(&raw).decode_utf8_lossy().into_owned();
    debug!("URL {url_to_fetch:?}");

    if url_to_fetch.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "Provide a valid URL to query from the caching system.",
        )
            .into_response();
    }

    match state
        .resolver
        .resolve(&url_to_fetch, Some(state.redirect_ttl))
        .await
    {
        Ok(Some(address)) => {
            info!("Redirecting to the cache at {:?}", address.url());
            found(address.url())
        }
        Ok(None) => {
            info!("Redirecting to the origin at {url_to_fetch:?}");
            found(&url_to_fetch)
        }
        Err(e) => {
            error!("Failed to resolve {url_to_fetch:?}: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Cache resolution failed.",
            )
                .into_response()
        }
    }
}

/// 302 Found with the given Location.
fn found(location: &str) -> Response {
    let mut headers = HeaderMap::new();
    match location.parse() {
        Ok(value) => {
            headers.insert(header::LOCATION, value);
            (StatusCode::FOUND, headers).into_response()
        }
        Err(_) => (
            StatusCode::BAD_REQUEST,
            "Provide a valid URL to query from the caching system.",
        )
            .into_response(),
    }
}
