//! # openwork-crypto — Signing for the openwork SDK
//!
//! Ed25519 keys and signatures, the [`Signer`] capability trait that the
//! marketplace client depends on, and the take-authorization payload that
//! anti-replay-binds a job claim to the job's event count.
//!
//! ## Security Invariants
//!
//! - Signing input is always `&CanonicalBytes` — you cannot sign raw bytes.
//!   Signer and verifier must hash identical byte sequences, and the
//!   canonicalization pipeline is the only way to produce them.
//! - Private keys are never serialized or logged. `Ed25519KeyPair` does not
//!   implement `Serialize` and its `Debug` output is redacted.

pub mod authorization;
pub mod ed25519;
pub mod signer;

pub use authorization::{TakeAuthorization, TakeAuthorizationError};
pub use ed25519::{verify, verify_with_public_key, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use signer::{LocalKeySigner, Signer, SignerError};
