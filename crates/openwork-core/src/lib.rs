//! # openwork-core — Foundational Types for the openwork SDK
//!
//! Defines the primitives every other crate in the workspace builds on:
//! address and identifier newtypes, canonical byte production, content
//! digests, and UTC timestamps. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `Address`, `JobId`,
//!    `EscrowId` — validated constructors, no bare strings or bare integers
//!    crossing crate boundaries.
//!
//! 2. **`CanonicalBytes` newtype.** Every byte sequence that feeds a
//!    signature or a digest of structured data flows through
//!    `CanonicalBytes::new()`. Two SDK implementations signing the same
//!    payload must produce the same bytes, or take authorizations verify on
//!    one side and fail on the other.
//!
//! 3. **UTC-only timestamps.** `Timestamp` enforces UTC with Z suffix and
//!    seconds precision, matching the canonicalization rules.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `openwork-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug` and `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_bytes, sha256_digest, ContentDigest};
pub use error::{CanonicalizationError, CoreError, CryptoError};
pub use identity::{Address, EscrowId, JobId};
pub use temporal::Timestamp;
