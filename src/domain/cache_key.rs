//! Content-addressable object keys derived from URLs.
//!
//! Every cached URL is stored under the lowercase hex SHA-256 digest of its
//! UTF-8 byte sequence. The mapping is deterministic and one-way; changing
//! the hash algorithm invalidates every existing cache entry.

use sha2::{Digest, Sha256};
use std::fmt;

/// Object-store key for a (potentially) cached URL.
///
/// Always 64 lowercase hex characters. Doubles as the object name in the
/// backing store, so identical URLs always land on the same object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for a URL.
    ///
    /// Total and pure: never fails, same output for the same byte sequence.
    pub fn derive(url: &str) -> Self {
        let digest = Sha256::digest(url.as_bytes());
        Self(hex::encode(digest))
    }

    /// Returns the key as a hex string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Sampling decision: whether this key's hex suffix equals the
    /// configured sentinel.
    ///
    /// An n-character suffix yields a uniform 1-in-16^n sampling rate
    /// (two characters: 1 in 256). The empty suffix matches every key,
    /// disabling sampling.
    pub fn matches_suffix(&self, suffix: &str) -> bool {
        self.0.ends_with(suffix)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic() {
        let url = "https://example.com/artifacts/build.log";
        assert_eq!(CacheKey::derive(url), CacheKey::derive(url));
    }

    #[test]
    fn test_derive_known_vector() {
        // SHA-256("abc")
        assert_eq!(
            CacheKey::derive("abc").as_str(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_derive_is_lowercase_hex_of_fixed_length() {
        let key = CacheKey::derive("https://example.com/");
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key.as_str(), key.as_str().to_lowercase());
    }

    #[test]
    fn test_distinct_urls_yield_distinct_keys() {
        assert_ne!(
            CacheKey::derive("https://example.com/a"),
            CacheKey::derive("https://example.com/b")
        );
    }

    #[test]
    fn test_matches_suffix() {
        let key = CacheKey::derive("https://example.com/");
        let suffix = &key.as_str()[62..];
        assert!(key.matches_suffix(suffix));
        assert!(key.matches_suffix(""));

        let other = if suffix == "zz" { "aa" } else { "zz" };
        assert!(!key.matches_suffix(other));
    }

    #[test]
    fn test_sampling_decision_is_stable() {
        let key = CacheKey::derive("https://example.com/some/file.bin");
        let first = key.matches_suffix("00");
        for _ in 0..10 {
            assert_eq!(CacheKey::derive("https://example.com/some/file.bin").matches_suffix("00"), first);
        }
    }
}
