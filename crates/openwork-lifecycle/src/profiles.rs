//! # User and Arbitrator Profiles
//!
//! On-ledger identity records. A profile is created once at registration and
//! mutated only through updates; it is never deleted. The address is derived
//! from the registered public key, so a profile can never claim an address
//! its key does not control.

use openwork_core::{Address, ContentDigest};
use openwork_crypto::Ed25519PublicKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum profile name length in bytes.
pub const MAX_NAME_LEN: usize = 64;

/// Maximum profile bio length in bytes.
pub const MAX_BIO_LEN: usize = 4096;

/// Maximum arbitrator fee, in basis points (100%).
pub const MAX_FEE_BPS: u16 = 10_000;

/// Profile validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// A profile name must be non-empty.
    #[error("profile name must not be empty")]
    EmptyName,

    /// A profile name over [`MAX_NAME_LEN`] bytes.
    #[error("profile name exceeds {MAX_NAME_LEN} bytes: {0}")]
    NameTooLong(usize),

    /// A profile bio over [`MAX_BIO_LEN`] bytes.
    #[error("profile bio exceeds {MAX_BIO_LEN} bytes: {0}")]
    BioTooLong(usize),

    /// An arbitrator fee above 100%.
    #[error("arbitrator fee exceeds {MAX_FEE_BPS} bps: {0}")]
    FeeTooHigh(u16),
}

fn validate_text(name: &str, bio: &str) -> Result<(), ProfileError> {
    if name.is_empty() {
        return Err(ProfileError::EmptyName);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ProfileError::NameTooLong(name.len()));
    }
    if bio.len() > MAX_BIO_LEN {
        return Err(ProfileError::BioTooLong(bio.len()));
    }
    Ok(())
}

/// A registered marketplace user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Derived from `public_key` at registration.
    pub address: Address,
    /// The key take authorizations from this user verify against.
    pub public_key: Ed25519PublicKey,
    /// Display name.
    pub name: String,
    /// Short self-description.
    pub bio: String,
    /// Digest of the avatar image in the content store, if any.
    pub avatar_hash: Option<ContentDigest>,
    /// Positive review count accumulated as a worker.
    pub reputation_up: u64,
    /// Negative review count accumulated as a worker.
    pub reputation_down: u64,
}

impl UserProfile {
    /// Register a new user. The address is derived from the public key.
    pub fn new(
        public_key: Ed25519PublicKey,
        name: impl Into<String>,
        bio: impl Into<String>,
        avatar_hash: Option<ContentDigest>,
    ) -> Result<Self, ProfileError> {
        let name = name.into();
        let bio = bio.into();
        validate_text(&name, &bio)?;
        Ok(Self {
            address: public_key.address(),
            public_key,
            name,
            bio,
            avatar_hash,
            reputation_up: 0,
            reputation_down: 0,
        })
    }

    /// Replace the mutable fields. Address, key, and reputation counters
    /// are not updatable.
    pub fn update(
        &mut self,
        name: impl Into<String>,
        bio: impl Into<String>,
        avatar_hash: Option<ContentDigest>,
    ) -> Result<(), ProfileError> {
        let name = name.into();
        let bio = bio.into();
        validate_text(&name, &bio)?;
        self.name = name;
        self.bio = bio;
        self.avatar_hash = avatar_hash;
        Ok(())
    }

    /// Record a worker review. Ratings of 1–2 count down, 3–5 count up.
    pub fn record_rating(&mut self, rating: u8) {
        if rating >= 3 {
            self.reputation_up += 1;
        } else {
            self.reputation_down += 1;
        }
    }
}

/// A registered arbitrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitratorProfile {
    /// Derived from `public_key` at registration.
    pub address: Address,
    /// The arbitrator's verification key.
    pub public_key: Ed25519PublicKey,
    /// Display name.
    pub name: String,
    /// Short self-description.
    pub bio: String,
    /// Digest of the avatar image in the content store, if any.
    pub avatar_hash: Option<ContentDigest>,
    /// Fee charged on arbitrated escrow, in basis points.
    pub fee_bps: u16,
    /// Disputes this arbitrator has settled.
    pub settled_count: u64,
    /// Disputes this arbitrator has refused.
    pub refused_count: u64,
}

impl ArbitratorProfile {
    /// Register a new arbitrator. The address is derived from the public
    /// key.
    pub fn new(
        public_key: Ed25519PublicKey,
        name: impl Into<String>,
        bio: impl Into<String>,
        avatar_hash: Option<ContentDigest>,
        fee_bps: u16,
    ) -> Result<Self, ProfileError> {
        let name = name.into();
        let bio = bio.into();
        validate_text(&name, &bio)?;
        if fee_bps > MAX_FEE_BPS {
            return Err(ProfileError::FeeTooHigh(fee_bps));
        }
        Ok(Self {
            address: public_key.address(),
            public_key,
            name,
            bio,
            avatar_hash,
            fee_bps,
            settled_count: 0,
            refused_count: 0,
        })
    }
}
