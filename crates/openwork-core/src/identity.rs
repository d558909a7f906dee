//! # Addresses and Identifiers
//!
//! Newtype wrappers for the identifiers of the marketplace domain. These
//! prevent accidental confusion — you cannot pass an `EscrowId` where a
//! `JobId` is expected, and an address is never a bare hex string.
//!
//! ## Invariants
//!
//! - `Address` is exactly 20 bytes, rendered as `0x` + 40 lowercase hex.
//! - `Address::ZERO` is the "no address" sentinel the ledger uses for
//!   "no arbitrator"; the SDK maps it to `Option::None` at the boundary.
//! - `JobId` values are assigned monotonically by the ledger and never reused.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::CoreError;

/// A 20-byte account address.
///
/// Serializes as a `0x`-prefixed lowercase hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

/// Unique identifier of a job. Assigned monotonically by the ledger at
/// publication and immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub u64);

/// Identifier of the escrow account backing a taken job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EscrowId(pub u64);

impl Address {
    /// The zero address — the ledger's sentinel for "no address".
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create an address from raw 20 bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derive an address from a 32-byte Ed25519 public key.
    ///
    /// The address is the trailing 20 bytes of `SHA-256(public_key)`,
    /// so an address commits to exactly one verifying key.
    pub fn from_public_key_bytes(public_key: &[u8; 32]) -> Self {
        let hash = Sha256::digest(public_key);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..32]);
        Self(bytes)
    }

    /// Return the raw 20 bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Render as `0x` + 40 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        let hex: String = self.0.iter().map(|b| format!("{b:02x}")).collect();
        format!("0x{hex}")
    }

    /// Parse from a `0x`-prefixed 40-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let stripped = s
            .strip_prefix("0x")
            .ok_or_else(|| CoreError::Identity(format!("address must start with 0x: {s:?}")))?;
        if stripped.len() != 40 {
            return Err(CoreError::Identity(format!(
                "address hex must be 40 chars, got {}",
                stripped.len()
            )));
        }
        let mut bytes = [0u8; 20];
        for (i, chunk) in bytes.iter_mut().enumerate() {
            let pos = i * 2;
            *chunk = u8::from_str_radix(&stripped[pos..pos + 2], 16)
                .map_err(|e| CoreError::Identity(format!("invalid hex at position {pos}: {e}")))?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl JobId {
    /// Access the inner sequence number.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "job:{}", self.0)
    }
}

impl EscrowId {
    /// Access the inner sequence number.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EscrowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "escrow:{}", self.0)
    }
}
