//! # Signer Capability Trait
//!
//! Abstracts "something that can produce a signature and an address". In
//! production this is backed by a wallet (local key, remote provider, or
//! browser extension); in tests it is a [`LocalKeySigner`] wrapping an
//! in-process keypair. Callers depend only on the trait.

use openwork_core::{Address, CanonicalBytes};
use thiserror::Error;

use crate::ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

/// Error produced by a signer backend.
#[derive(Error, Debug)]
pub enum SignerError {
    /// The signer backend has no active connection (e.g., wallet not
    /// connected yet). Connect before signing.
    #[error("signer not connected")]
    NotConnected,

    /// The backend refused to sign (user rejection, locked key, backend fault).
    #[error("signing rejected: {0}")]
    Rejected(String),
}

/// Abstract interface for signature production.
///
/// Implementations must be interchangeable at compile time; the marketplace
/// client is generic over this trait and never inspects the backing key
/// material.
pub trait Signer: Send + Sync {
    /// The address this signer controls.
    fn address(&self) -> Address;

    /// The verifying key matching [`Signer::address()`].
    fn public_key(&self) -> Ed25519PublicKey;

    /// Sign canonical bytes.
    ///
    /// The input is `&CanonicalBytes` so every backend signs the same byte
    /// sequence the ledger will verify against.
    fn sign(&self, data: &CanonicalBytes) -> Result<Ed25519Signature, SignerError>;
}

/// A signer backed by an in-process Ed25519 key pair.
pub struct LocalKeySigner {
    keypair: Ed25519KeyPair,
}

impl LocalKeySigner {
    /// Generate a signer with a fresh random key pair.
    pub fn generate() -> Self {
        Self {
            keypair: Ed25519KeyPair::generate(),
        }
    }

    /// Create a signer from a raw 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            keypair: Ed25519KeyPair::from_seed(seed),
        }
    }
}

impl Signer for LocalKeySigner {
    fn address(&self) -> Address {
        self.keypair.address()
    }

    fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }

    fn sign(&self, data: &CanonicalBytes) -> Result<Ed25519Signature, SignerError> {
        // A local key is always available; rejection paths belong to
        // remote/extension backends.
        Ok(self.keypair.sign(data))
    }
}

impl std::fmt::Debug for LocalKeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LocalKeySigner({})", self.address())
    }
}
