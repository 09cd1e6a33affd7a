//! Content-Disposition derivation for cached downloads.
//!
//! When the origin response carries its own `Content-Disposition` header it
//! is stored verbatim. Otherwise one is synthesized from the final URL's
//! last path segment so browsers get a sensible download filename, with
//! RFC 2047 encoding applied to tolerate non-ASCII names in the header.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use percent_encoding::percent_decode_str;
use url::Url;

/// Derives the Content-Disposition label for a fetched URL.
///
/// # Arguments
///
/// - `header` - the origin response's own `Content-Disposition`, if any
/// - `final_url` - the URL the fetch ended on after redirects
///
/// # Behavior
///
/// 1. Origin header present: returned as-is
/// 2. Final URL has a non-empty last path segment: `attachment; filename="<name>"`
/// 3. Otherwise: bare `attachment`
pub fn derive_content_disposition(header: Option<&str>, final_url: &Url) -> String {
    if let Some(value) = header {
        return value.to_string();
    }

    // Url keeps the path percent-encoded; decode the segment so the stored
    // filename matches what the origin actually called the file.
    let segment = final_url.path().rsplit('/').next().unwrap_or_default();
    let filename = percent_decode_str(segment).decode_utf8_lossy();

    if filename.is_empty() {
        "attachment".to_string()
    } else {
        format!("attachment; filename=\"{}\"", encode_filename(&filename))
    }
}

/// Encodes a filename for use inside a header value.
///
/// ASCII names pass through unchanged; anything else becomes an RFC 2047
/// encoded-word (`=?utf-8?b?...?=`) so the header stays 7-bit clean.
fn encode_filename(name: &str) -> String {
    if name.is_ascii() && !name.contains('"') {
        name.to_string()
    } else {
        format!("=?utf-8?b?{}?=", BASE64.encode(name.as_bytes()))
    }
}
