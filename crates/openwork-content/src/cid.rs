//! # CID Codec
//!
//! Compact content identifiers for off-ledger payloads: a SHA-256 digest
//! wrapped in the multihash framing `0x12 0x20 || digest` and base58
//! encoded. `0x12` names SHA-256 and `0x20` the 32-byte length, so the
//! string self-describes the hash it carries.

use openwork_core::ContentDigest;
use thiserror::Error;

/// Multihash code for SHA-256.
const MULTIHASH_SHA256: u8 = 0x12;

/// Multihash length byte for a 32-byte digest.
const MULTIHASH_LEN: u8 = 0x20;

/// A string that failed to parse as a CID.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidError {
    /// Not valid base58.
    #[error("invalid base58 in CID: {0}")]
    InvalidBase58(String),

    /// Decoded to something other than 34 bytes.
    #[error("CID must decode to 34 bytes, got {0}")]
    InvalidLength(usize),

    /// The two-byte multihash prefix names a hash we do not speak.
    #[error("unsupported multihash prefix: {0:#04x} {1:#04x}")]
    UnsupportedPrefix(u8, u8),
}

/// Encode a digest as a base58 CID string.
pub fn to_cid(digest: &ContentDigest) -> String {
    let mut framed = [0u8; 34];
    framed[0] = MULTIHASH_SHA256;
    framed[1] = MULTIHASH_LEN;
    framed[2..].copy_from_slice(&digest.0);
    bs58::encode(framed).into_string()
}

/// Decode a base58 CID string back into a digest.
pub fn from_cid(cid: &str) -> Result<ContentDigest, CidError> {
    let bytes = bs58::decode(cid)
        .into_vec()
        .map_err(|e| CidError::InvalidBase58(e.to_string()))?;
    if bytes.len() != 34 {
        return Err(CidError::InvalidLength(bytes.len()));
    }
    if bytes[0] != MULTIHASH_SHA256 || bytes[1] != MULTIHASH_LEN {
        return Err(CidError::UnsupportedPrefix(bytes[0], bytes[1]));
    }
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&bytes[2..]);
    Ok(ContentDigest(digest))
}
