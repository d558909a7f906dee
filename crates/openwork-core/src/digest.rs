//! # Content Digest — Content-Addressed Identifiers
//!
//! Defines `ContentDigest`, the 32-byte SHA-256 digest used both for
//! content addressing (job descriptions, delivered results stored off-chain)
//! and for take-authorization payload hashing.
//!
//! ## Two Digest Paths
//!
//! - [`sha256_digest()`] accepts only `&CanonicalBytes` — the path for
//!   digests of structured data (signature payloads). The signature enforces
//!   at compile time that the bytes came through the canonicalization
//!   pipeline.
//! - [`sha256_bytes()`] accepts raw `&[u8]` — the path for content
//!   addressing, where the digest must be over the stored bytes exactly as
//!   uploaded, not over a re-serialization of them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CoreError;

/// A 32-byte SHA-256 content digest.
///
/// Serializes as a 64-character lowercase hex string; displays with a
/// `sha256:` prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentDigest(pub [u8; 32]);

impl ContentDigest {
    /// Create a digest from raw 32 bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a 64-character lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a digest from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CoreError> {
        let hex = hex.trim().to_lowercase();
        if hex.len() != 64 {
            return Err(CoreError::Identity(format!(
                "digest hex must be 64 chars, got {}",
                hex.len()
            )));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in bytes.iter_mut().enumerate() {
            let pos = i * 2;
            *chunk = u8::from_str_radix(&hex[pos..pos + 2], 16)
                .map_err(|e| CoreError::Identity(format!("invalid hex at position {pos}: {e}")))?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.0.iter().take(4).map(|b| format!("{b:02x}")).collect();
        write!(f, "ContentDigest({prefix}...)")
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Compute a SHA-256 digest of canonical bytes.
///
/// This is the digest path for structured data — most importantly the take
/// authorization payload. Accepting only `&CanonicalBytes` prevents any code
/// path from hashing non-canonical bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> ContentDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest(bytes)
}

/// Compute a SHA-256 digest of raw content bytes.
///
/// This is the content-addressing path: the digest of an uploaded artifact
/// is over its bytes exactly as stored, so a retrieved artifact can be
/// verified against the digest it was requested by.
pub fn sha256_bytes(data: &[u8]) -> ContentDigest {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_digest_deterministic() {
        let cb = CanonicalBytes::new(&serde_json::json!({"job_id": 1, "events_length": 0})).unwrap();
        assert_eq!(sha256_digest(&cb), sha256_digest(&cb));
    }

    #[test]
    fn test_raw_digest_known_vector() {
        // SHA256 of the empty input is a fixed, well-known value.
        let d = sha256_bytes(b"");
        assert_eq!(
            d.to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_canonical_and_raw_agree_on_same_bytes() {
        let cb = CanonicalBytes::new(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(sha256_digest(&cb), sha256_bytes(cb.as_bytes()));
    }

    #[test]
    fn test_different_inputs_different_digests() {
        assert_ne!(sha256_bytes(b"result v1"), sha256_bytes(b"result v2"));
    }

    #[test]
    fn test_display_prefixed() {
        let d = sha256_bytes(b"content");
        let s = d.to_string();
        assert!(s.starts_with("sha256:"));
        assert_eq!(s.len(), 7 + 64);
    }

    #[test]
    fn test_hex_roundtrip() {
        let d = sha256_bytes(b"artifact");
        let back = ContentDigest::from_hex(&d.to_hex()).unwrap();
        assert_eq!(d, back);
    }

    #[test]
    fn test_from_hex_rejects_bad_input() {
        assert!(ContentDigest::from_hex("abcd").is_err());
        assert!(ContentDigest::from_hex(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let d = sha256_bytes(b"job description");
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json.len(), 64 + 2);
        let back: ContentDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);
    }
}
