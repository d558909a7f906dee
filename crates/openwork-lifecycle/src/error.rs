//! # Lifecycle Errors
//!
//! Structured rejection reasons for the job state machine. An invalid
//! transition is a validation failure the caller can act on, never a panic;
//! the error names the (state, event, role) triple that was rejected and a
//! human-readable reason.

use thiserror::Error;

use crate::state::{CallerRole, JobState};

/// Errors produced by job lifecycle validation and folding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The attempted event is not permitted for this (state, role)
    /// combination. Recoverable — the caller should adjust state or role.
    #[error("invalid transition: {event} on {state} job by {role}: {reason}")]
    InvalidTransition {
        /// Job state at the time of the attempt.
        state: JobState,
        /// Name of the attempted event.
        event: &'static str,
        /// Role the caller holds on this job.
        role: CallerRole,
        /// Why the transition was rejected.
        reason: String,
    },

    /// An event log did not begin with a `Created` event.
    #[error("event log must begin with a Created event")]
    MissingCreated,

    /// A `Created` event appeared after the job already existed.
    #[error("Created event is only valid as the first event of a job")]
    UnexpectedCreated,

    /// A rating outside the accepted 1–5 range.
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    /// Arbitration shares that do not split the whole escrow.
    #[error("arbitration shares must sum to 100, got creator {creator_share} + worker {worker_share}")]
    InvalidShares {
        /// Percentage awarded to the creator.
        creator_share: u8,
        /// Percentage awarded to the worker.
        worker_share: u8,
    },

    /// A job published with a zero escrow amount.
    #[error("job amount must be non-zero")]
    ZeroAmount,

    /// An unrecognized category wire code.
    #[error("unknown category code: {0:?}")]
    UnknownCategory(String),
}
