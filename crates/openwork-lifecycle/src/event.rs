//! # Job Events
//!
//! The append-only record attached to a job. The ordered event sequence is
//! the source of truth from which job state is derived; the `Job` struct's
//! fields are a materialized view of this log.

use openwork_core::{Address, ContentDigest, EscrowId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::category::{Category, Tag};

/// An immutable event in a job's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEvent {
    /// What happened, with its payload.
    pub kind: JobEventKind,
    /// The address that caused the event.
    pub actor: Address,
    /// Ledger time of the event. Timeout preconditions are evaluated
    /// against this, never against the wall clock, so replay is
    /// deterministic.
    pub timestamp: Timestamp,
}

impl JobEvent {
    /// Create an event stamped with the current time.
    pub fn new(kind: JobEventKind, actor: Address) -> Self {
        Self {
            kind,
            actor,
            timestamp: Timestamp::now(),
        }
    }

    /// Create an event with an explicit timestamp, as read back from the
    /// ledger or constructed in tests.
    pub fn at(kind: JobEventKind, actor: Address, timestamp: Timestamp) -> Self {
        Self {
            kind,
            actor,
            timestamp,
        }
    }
}

/// The event vocabulary of the job lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEventKind {
    /// Job published. Only valid as the first event of a log.
    Created {
        /// Short human-readable title.
        title: String,
        /// Digest of the full job description in the content store.
        content_hash: ContentDigest,
        /// The single MECE category.
        category: Category,
        /// Free-form search tags.
        tags: Vec<Tag>,
        /// Token the escrow is denominated in.
        token: Address,
        /// Escrowed amount, in the token's smallest unit.
        amount: u128,
        /// Delivery window in seconds, measured from the Take event.
        max_time: u64,
        /// Arbitrator fixed at creation; `None` means no arbitrator.
        arbitrator: Option<Address>,
        /// Whether multiple workers may apply before one takes the job.
        multiple_applicants: bool,
        /// Whether Take is gated on the whitelist set.
        whitelist_workers: bool,
    },

    /// Terms revised by the creator while the job is still Open.
    Updated {
        /// Revised title.
        title: String,
        /// Digest of the revised description.
        content_hash: ContentDigest,
        /// Revised escrow amount.
        amount: u128,
        /// Revised delivery window in seconds.
        max_time: u64,
        /// Revised arbitrator assignment.
        arbitrator: Option<Address>,
    },

    /// A worker claimed the job. The actor becomes the worker.
    Taken {
        /// Escrow account assigned by the ledger at take time.
        escrow_id: EscrowId,
    },

    /// The worker submitted a result. May occur repeatedly; the latest
    /// digest wins.
    Delivered {
        /// Digest of the delivered result in the content store.
        result_hash: ContentDigest,
    },

    /// The creator accepted the delivered result. Releases escrow to the
    /// worker and closes the job.
    Approved {
        /// Optional 1–5 rating recorded alongside the approval.
        rating: Option<u8>,
    },

    /// A rating recorded after the fact for a completed, unrated job.
    Rated {
        /// 1–5 rating.
        rating: u8,
    },

    /// Escrow returned and the job released back to Open.
    Refunded {
        /// True when the creator reclaimed the job after the delivery
        /// window elapsed, false when the worker walked away.
        by_timeout: bool,
    },

    /// The creator or worker raised a dispute.
    Disputed {
        /// Optional digest of the dispute statement.
        content_hash: Option<ContentDigest>,
    },

    /// The arbitrator resolved a disputed job, splitting the escrow.
    Arbitrated {
        /// Percentage of escrow awarded to the creator.
        creator_share: u8,
        /// Percentage of escrow awarded to the worker.
        worker_share: u8,
        /// Optional digest of the arbitration reasoning.
        reason_hash: Option<ContentDigest>,
    },

    /// The arbitrator declined to arbitrate. Clears the dispute flag; the
    /// arbitrator stays appointed and either party may dispute again.
    ArbitrationRefused,

    /// The creator closed an Open job without work done.
    Closed,

    /// The creator reopened a job that was closed without a worker.
    Reopened,

    /// The creator withdrew collateral owed after a close.
    CollateralWithdrawn,

    /// An address became eligible to take a whitelist-gated job.
    WhitelistedWorkerAdded {
        /// The whitelisted address.
        worker: Address,
    },

    /// An address lost eligibility to take a whitelist-gated job.
    WhitelistedWorkerRemoved {
        /// The removed address.
        worker: Address,
    },

    /// A message from the creator to a participant.
    OwnerMessage {
        /// Digest of the message body in the content store.
        content_hash: ContentDigest,
        /// The addressee.
        recipient: Address,
    },

    /// A message from a worker or applicant to the creator.
    WorkerMessage {
        /// Digest of the message body in the content store.
        content_hash: ContentDigest,
        /// The addressee.
        recipient: Address,
    },
}

impl JobEventKind {
    /// The event name used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "Created",
            Self::Updated { .. } => "Updated",
            Self::Taken { .. } => "Taken",
            Self::Delivered { .. } => "Delivered",
            Self::Approved { .. } => "Approved",
            Self::Rated { .. } => "Rated",
            Self::Refunded { .. } => "Refunded",
            Self::Disputed { .. } => "Disputed",
            Self::Arbitrated { .. } => "Arbitrated",
            Self::ArbitrationRefused => "ArbitrationRefused",
            Self::Closed => "Closed",
            Self::Reopened => "Reopened",
            Self::CollateralWithdrawn => "CollateralWithdrawn",
            Self::WhitelistedWorkerAdded { .. } => "WhitelistedWorkerAdded",
            Self::WhitelistedWorkerRemoved { .. } => "WhitelistedWorkerRemoved",
            Self::OwnerMessage { .. } => "OwnerMessage",
            Self::WorkerMessage { .. } => "WorkerMessage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    #[test]
    fn test_event_serde_roundtrip() {
        let event = JobEvent::new(
            JobEventKind::Delivered {
                result_hash: openwork_core::sha256_bytes(b"result"),
            },
            addr(2),
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: JobEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_kind_tagged_externally() {
        let json = serde_json::to_value(JobEventKind::ArbitrationRefused).unwrap();
        assert_eq!(json["type"], "arbitration_refused");
    }

    #[test]
    fn test_names() {
        assert_eq!(
            JobEventKind::Taken {
                escrow_id: EscrowId(1)
            }
            .name(),
            "Taken"
        );
        assert_eq!(JobEventKind::Closed.name(), "Closed");
    }
}
