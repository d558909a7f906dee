//! # ContentStore Capability Trait
//!
//! Off-ledger payload storage, addressed by SHA-256 digest. The ledger only
//! ever carries digests; titles aside, every description, result, message
//! body, and dispute statement lives behind this interface.
//!
//! ## Security Invariant
//!
//! - `get` MUST verify that the returned bytes hash to the requested
//!   digest. A store that returns unverified bytes lets a malicious backend
//!   substitute content under a trusted identifier.

use std::collections::HashMap;
use std::sync::Mutex;

use openwork_core::{sha256_bytes, ContentDigest};
use thiserror::Error;
use tracing::debug;

use crate::cid::CidError;

/// Errors from a content-store backend. All variants are non-fatal; the
/// host may retry.
#[derive(Error, Debug)]
pub enum ContentError {
    /// No content stored under the requested digest.
    #[error("content not found: {0}")]
    NotFound(ContentDigest),

    /// The backend did not answer in time.
    #[error("content store timed out")]
    Timeout,

    /// The backend is unreachable or refusing service.
    #[error("content store unavailable: {0}")]
    ServiceUnavailable(String),

    /// The returned bytes do not hash to the requested digest.
    #[error("content integrity failure: requested {requested}, got {actual}")]
    Integrity {
        /// The digest the caller asked for.
        requested: ContentDigest,
        /// The digest of the bytes the backend returned.
        actual: ContentDigest,
    },

    /// A malformed content identifier string.
    #[error(transparent)]
    InvalidCid(#[from] CidError),
}

/// Abstract interface for content-addressed storage.
///
/// Implementations are interchangeable; the marketplace client is generic
/// over this trait and never assumes a particular backend.
pub trait ContentStore {
    /// Store bytes and return their digest.
    fn put(
        &self,
        bytes: &[u8],
    ) -> impl std::future::Future<Output = Result<ContentDigest, ContentError>> + Send;

    /// Fetch the bytes for a digest, verifying integrity before returning.
    fn get(
        &self,
        digest: &ContentDigest,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, ContentError>> + Send;
}

/// An in-process content store for tests and local development.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    blobs: Mutex<HashMap<ContentDigest, Vec<u8>>>,
}

impl MemoryContentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.lock().map(|b| b.len()).unwrap_or(0)
    }

    /// Whether the store holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Corrupt a stored blob in place. Test hook for integrity-check paths.
    #[doc(hidden)]
    pub fn corrupt(&self, digest: &ContentDigest, bytes: Vec<u8>) {
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.insert(*digest, bytes);
        }
    }
}

impl ContentStore for MemoryContentStore {
    async fn put(&self, bytes: &[u8]) -> Result<ContentDigest, ContentError> {
        let digest = sha256_bytes(bytes);
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| ContentError::ServiceUnavailable("store lock poisoned".into()))?;
        blobs.insert(digest, bytes.to_vec());
        debug!(%digest, size = bytes.len(), "content stored");
        Ok(digest)
    }

    async fn get(&self, digest: &ContentDigest) -> Result<Vec<u8>, ContentError> {
        let bytes = {
            let blobs = self
                .blobs
                .lock()
                .map_err(|_| ContentError::ServiceUnavailable("store lock poisoned".into()))?;
            blobs.get(digest).cloned()
        }
        .ok_or(ContentError::NotFound(*digest))?;

        let actual = sha256_bytes(&bytes);
        if actual != *digest {
            return Err(ContentError::Integrity {
                requested: *digest,
                actual,
            });
        }
        Ok(bytes)
    }
}
