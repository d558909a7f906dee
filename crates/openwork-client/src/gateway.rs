//! # LedgerGateway Capability Trait
//!
//! The client's only window onto the ledger. Reads return event logs and
//! profiles; writes submit a [`TxRequest`] and come back with a
//! [`PendingTx`] handle immediately — finality is the caller's concern,
//! polled separately through [`LedgerGateway::wait`].
//!
//! Gateway failures are surfaced verbatim. The client never retries on the
//! caller's behalf; a `Timeout` here means "outcome unknown", and only the
//! host application knows whether re-submitting is safe.

use openwork_core::{Address, ContentDigest, JobId, Timestamp};
use openwork_crypto::{Ed25519PublicKey, TakeAuthorization};
use openwork_lifecycle::{ArbitratorProfile, Category, JobEvent, Tag, UserProfile};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors from a ledger gateway backend.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Transport failure before the ledger answered.
    #[error("gateway network error: {0}")]
    Network(String),

    /// The ledger rejected the transaction, with its reason.
    #[error("transaction reverted: {0}")]
    Reverted(String),

    /// The backend did not answer in time. The outcome is unknown.
    #[error("gateway timed out")]
    Timeout,
}

/// A write operation and its payload, exactly as the ledger expects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TxKind {
    /// Publish a new job.
    CreateJob {
        title: String,
        content_hash: ContentDigest,
        category: Category,
        tags: Vec<Tag>,
        token: Address,
        amount: u128,
        max_time: u64,
        arbitrator: Option<Address>,
        multiple_applicants: bool,
        whitelist_workers: bool,
    },
    /// Revise an Open job's terms.
    UpdateJob {
        job_id: JobId,
        title: String,
        content_hash: ContentDigest,
        amount: u128,
        max_time: u64,
        arbitrator: Option<Address>,
    },
    /// Claim a job. Carries the anti-replay authorization.
    TakeJob {
        job_id: JobId,
        authorization: TakeAuthorization,
    },
    /// Submit a result for a taken job.
    DeliverResult {
        job_id: JobId,
        result_hash: ContentDigest,
    },
    /// Accept the delivered result and release escrow.
    ApproveResult {
        job_id: JobId,
        rating: Option<u8>,
    },
    /// Return escrow and release the job back to Open.
    Refund { job_id: JobId },
    /// Raise a dispute on a taken job.
    Dispute {
        job_id: JobId,
        content_hash: Option<ContentDigest>,
    },
    /// Resolve a dispute, splitting escrow by percentage.
    Arbitrate {
        job_id: JobId,
        creator_share: u8,
        worker_share: u8,
        reason_hash: Option<ContentDigest>,
    },
    /// Decline to arbitrate a dispute.
    RefuseArbitration { job_id: JobId },
    /// Close an Open job without work done.
    CloseJob { job_id: JobId },
    /// Reopen a job closed without a worker.
    ReopenJob { job_id: JobId },
    /// Withdraw collateral owed after a close.
    WithdrawCollateral { job_id: JobId },
    /// Rate a completed, unrated job after the fact.
    Review { job_id: JobId, rating: u8 },
    /// Whitelist a worker on an Open job.
    WhitelistAdd { job_id: JobId, worker: Address },
    /// Remove a worker from an Open job's whitelist.
    WhitelistRemove { job_id: JobId, worker: Address },
    /// Post a message from the creator.
    OwnerMessage {
        job_id: JobId,
        content_hash: ContentDigest,
        recipient: Address,
    },
    /// Post a message from a worker or applicant.
    WorkerMessage {
        job_id: JobId,
        content_hash: ContentDigest,
        recipient: Address,
    },
    /// Register a user profile.
    RegisterUser {
        public_key: Ed25519PublicKey,
        name: String,
        bio: String,
        avatar_hash: Option<ContentDigest>,
    },
    /// Update a user profile's mutable fields.
    UpdateUser {
        name: String,
        bio: String,
        avatar_hash: Option<ContentDigest>,
    },
    /// Register an arbitrator profile.
    RegisterArbitrator {
        public_key: Ed25519PublicKey,
        name: String,
        bio: String,
        avatar_hash: Option<ContentDigest>,
        fee_bps: u16,
    },
}

impl TxKind {
    /// The operation name used in errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateJob { .. } => "create_job",
            Self::UpdateJob { .. } => "update_job",
            Self::TakeJob { .. } => "take_job",
            Self::DeliverResult { .. } => "deliver_result",
            Self::ApproveResult { .. } => "approve_result",
            Self::Refund { .. } => "refund",
            Self::Dispute { .. } => "dispute",
            Self::Arbitrate { .. } => "arbitrate",
            Self::RefuseArbitration { .. } => "refuse_arbitration",
            Self::CloseJob { .. } => "close_job",
            Self::ReopenJob { .. } => "reopen_job",
            Self::WithdrawCollateral { .. } => "withdraw_collateral",
            Self::Review { .. } => "review",
            Self::WhitelistAdd { .. } => "whitelist_add",
            Self::WhitelistRemove { .. } => "whitelist_remove",
            Self::OwnerMessage { .. } => "owner_message",
            Self::WorkerMessage { .. } => "worker_message",
            Self::RegisterUser { .. } => "register_user",
            Self::UpdateUser { .. } => "update_user",
            Self::RegisterArbitrator { .. } => "register_arbitrator",
        }
    }
}

/// A signed-intent write, attributed to its sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxRequest {
    /// The operation and payload.
    pub kind: TxKind,
    /// The address submitting the transaction.
    pub sender: Address,
}

/// Handle to a submitted, not-yet-final transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTx {
    /// Client-side correlation id.
    pub id: Uuid,
    /// When the gateway accepted the submission.
    pub submitted_at: Timestamp,
}

/// Outcome of a finalized transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// The pending handle this receipt settles.
    pub tx_id: Uuid,
    /// The job the transaction touched or created, if any.
    pub job_id: Option<JobId>,
    /// The job's event count after the transaction, if any.
    pub events_length: Option<u64>,
}

/// Abstract interface to the marketplace ledger.
pub trait LedgerGateway {
    /// Total number of jobs ever created.
    fn job_count(&self) -> impl std::future::Future<Output = Result<u64, GatewayError>> + Send;

    /// The full ordered event log of a job.
    fn job_events(
        &self,
        id: JobId,
    ) -> impl std::future::Future<Output = Result<Vec<JobEvent>, GatewayError>> + Send;

    /// The registered user profile at an address, if any.
    fn user(
        &self,
        address: Address,
    ) -> impl std::future::Future<Output = Result<Option<UserProfile>, GatewayError>> + Send;

    /// The registered arbitrator profile at an address, if any.
    fn arbitrator(
        &self,
        address: Address,
    ) -> impl std::future::Future<Output = Result<Option<ArbitratorProfile>, GatewayError>> + Send;

    /// Submit a transaction. Returns as soon as the ledger accepts the
    /// submission; finality is observed via [`LedgerGateway::wait`].
    fn submit(
        &self,
        tx: TxRequest,
    ) -> impl std::future::Future<Output = Result<PendingTx, GatewayError>> + Send;

    /// Block until a submitted transaction finalizes.
    fn wait(
        &self,
        tx: &PendingTx,
    ) -> impl std::future::Future<Output = Result<TxReceipt, GatewayError>> + Send;
}
