//! # Take Authorization — Anti-Replay Job Claims
//!
//! To take a job, a worker canonicalizes `{ "events_length": N, "job_id": J }`
//! where `N` is the length of the job's event log at signing time, hashes the
//! canonical bytes with SHA-256, and signs the digest with Ed25519. `N`
//! counts every event including the creation event, so a freshly published
//! job signs at 1. The ledger recomputes the payload from
//! the job's *current* event count before checking the signature, so a
//! signature produced against an older log length is rejected as stale —
//! a simple anti-replay nonce scheme.
//!
//! The payload deliberately binds only `(events_length, job_id)`, matching
//! the on-chain verifier; binding the worker address as well would change
//! the bytes the ledger expects.

use openwork_core::error::{CanonicalizationError, CryptoError};
use openwork_core::{CanonicalBytes, JobId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ed25519::{verify_with_public_key, Ed25519PublicKey, Ed25519Signature};
use crate::signer::{Signer, SignerError};

/// Error verifying a take authorization.
#[derive(Error, Debug)]
pub enum TakeAuthorizationError {
    /// The signed events-length no longer matches the job's event count.
    /// Recoverable: re-sign against the current count.
    #[error("stale take signature: signed events_length {signed}, current {current}")]
    Stale {
        /// The events-length the signature was computed against.
        signed: u64,
        /// The job's event count at verification time.
        current: u64,
    },

    /// The signature does not verify against the worker's public key.
    #[error(transparent)]
    Verification(#[from] CryptoError),

    /// Payload canonicalization failed.
    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),

    /// The signer backend failed.
    #[error(transparent)]
    Signer(#[from] SignerError),
}

/// The canonical take payload. Field order is irrelevant — canonicalization
/// sorts keys — but the field *names* are part of the wire contract.
#[derive(Debug, Serialize)]
struct TakePayload {
    events_length: u64,
    job_id: u64,
}

/// A signed claim on a job, bound to the job's event count at signing time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakeAuthorization {
    /// The job being claimed.
    pub job_id: JobId,
    /// The event-log length the signature was computed against.
    pub events_length: u64,
    /// Ed25519 signature over the SHA-256 digest of the canonical payload.
    pub signature: Ed25519Signature,
}

impl TakeAuthorization {
    /// The canonical bytes a take signature covers.
    pub fn payload_bytes(
        job_id: JobId,
        events_length: u64,
    ) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(&TakePayload {
            events_length,
            job_id: job_id.as_u64(),
        })
    }

    /// Sign a take authorization for `job_id` at the given event count.
    pub fn sign<S: Signer + ?Sized>(
        signer: &S,
        job_id: JobId,
        events_length: u64,
    ) -> Result<Self, TakeAuthorizationError> {
        let payload = Self::payload_bytes(job_id, events_length)?;
        let signature = signer.sign(&payload)?;
        Ok(Self {
            job_id,
            events_length,
            signature,
        })
    }

    /// Verify this authorization against the job's current event count and
    /// the claimed worker's public key.
    ///
    /// The freshness check runs first: a stale events-length is rejected
    /// before any signature verification, so callers can distinguish
    /// "re-sign and retry" from "invalid signature".
    pub fn verify(
        &self,
        current_events_length: u64,
        public_key: &Ed25519PublicKey,
    ) -> Result<(), TakeAuthorizationError> {
        if self.events_length != current_events_length {
            return Err(TakeAuthorizationError::Stale {
                signed: self.events_length,
                current: current_events_length,
            });
        }
        let payload = Self::payload_bytes(self.job_id, self.events_length)?;
        verify_with_public_key(&payload, &self.signature, public_key)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::LocalKeySigner;

    #[test]
    fn test_payload_bytes_are_canonical() {
        let payload = TakeAuthorization::payload_bytes(JobId(1), 0).unwrap();
        let s = std::str::from_utf8(payload.as_bytes()).unwrap();
        assert_eq!(s, r#"{"events_length":0,"job_id":1}"#);
    }

    #[test]
    fn test_sign_then_verify_fresh() {
        let signer = LocalKeySigner::generate();
        let auth = TakeAuthorization::sign(&signer, JobId(7), 3).unwrap();
        auth.verify(3, &signer.public_key()).expect("fresh authorization should verify");
    }

    #[test]
    fn test_stale_events_length_rejected() {
        let signer = LocalKeySigner::generate();
        let auth = TakeAuthorization::sign(&signer, JobId(7), 0).unwrap();
        match auth.verify(2, &signer.public_key()).unwrap_err() {
            TakeAuthorizationError::Stale { signed, current } => {
                assert_eq!(signed, 0);
                assert_eq!(current, 2);
            }
            other => panic!("expected Stale, got: {other}"),
        }
    }

    #[test]
    fn test_wrong_key_rejected() {
        let signer = LocalKeySigner::generate();
        let other = LocalKeySigner::generate();
        let auth = TakeAuthorization::sign(&signer, JobId(7), 1).unwrap();
        assert!(matches!(
            auth.verify(1, &other.public_key()),
            Err(TakeAuthorizationError::Verification(_))
        ));
    }

    #[test]
    fn test_signature_does_not_transfer_across_jobs() {
        let signer = LocalKeySigner::generate();
        let auth = TakeAuthorization::sign(&signer, JobId(7), 1).unwrap();
        let forged = TakeAuthorization {
            job_id: JobId(8),
            ..auth
        };
        assert!(matches!(
            forged.verify(1, &signer.public_key()),
            Err(TakeAuthorizationError::Verification(_))
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let signer = LocalKeySigner::generate();
        let auth = TakeAuthorization::sign(&signer, JobId(7), 5).unwrap();
        let json = serde_json::to_string(&auth).unwrap();
        let back: TakeAuthorization = serde_json::from_str(&json).unwrap();
        assert_eq!(back.job_id, auth.job_id);
        assert_eq!(back.events_length, auth.events_length);
        assert_eq!(back.signature, auth.signature);
        back.verify(5, &signer.public_key()).expect("should still verify");
    }
}
