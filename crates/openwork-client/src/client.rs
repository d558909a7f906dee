//! # MarketplaceClient
//!
//! One async method per marketplace operation. Every write follows the same
//! shape: read the job's current events, validate the transition locally
//! through the lifecycle fold, build the exact transaction payload, submit,
//! and hand back the [`PendingTx`] without waiting for finality. Local
//! validation catches doomed transactions before they cost a ledger round
//! trip; the ledger remains the authority and revalidates everything.
//!
//! The client mutates no state of its own beyond the connection slot.
//! Failures are returned to the caller verbatim — no automatic retries.

use openwork_core::{Address, ContentDigest, EscrowId, JobId, Timestamp};
use openwork_crypto::{Signer, TakeAuthorization};
use openwork_lifecycle::{
    ArbitratorProfile, Category, Job, JobEvent, JobEventKind, Tag, UserProfile,
};
use tracing::{debug, info};

use crate::connection::{ClientConfig, Connection};
use crate::error::ClientError;
use crate::gateway::{LedgerGateway, PendingTx, TxKind, TxReceipt, TxRequest};
use openwork_content::ContentStore;

/// Parameters for publishing a new job.
#[derive(Debug, Clone)]
pub struct JobSpec {
    /// Short human-readable title.
    pub title: String,
    /// Full description, stored off-ledger.
    pub description: Vec<u8>,
    /// The single MECE category.
    pub category: Category,
    /// Free-form search tags.
    pub tags: Vec<Tag>,
    /// Token the escrow is denominated in.
    pub token: Address,
    /// Escrowed amount, in the token's smallest unit.
    pub amount: u128,
    /// Delivery window in seconds.
    pub max_time: u64,
    /// Arbitrator fixed at creation, if any.
    pub arbitrator: Option<Address>,
    /// Whether multiple workers may apply.
    pub multiple_applicants: bool,
    /// Whether Take is gated on the whitelist.
    pub whitelist_workers: bool,
}

/// Parameters for revising an Open job.
#[derive(Debug, Clone)]
pub struct JobUpdate {
    /// Revised title.
    pub title: String,
    /// Revised description, stored off-ledger.
    pub description: Vec<u8>,
    /// Revised escrow amount.
    pub amount: u128,
    /// Revised delivery window in seconds.
    pub max_time: u64,
    /// Revised arbitrator assignment.
    pub arbitrator: Option<Address>,
}

/// The marketplace client, generic over its three capabilities.
pub struct MarketplaceClient<G, C, S> {
    gateway: G,
    content: C,
    connection: Connection<S>,
    config: ClientConfig,
}

impl<G, C, S> MarketplaceClient<G, C, S>
where
    G: LedgerGateway + Sync,
    C: ContentStore + Sync,
    S: Signer,
{
    /// Create a disconnected client over a gateway and content store.
    pub fn new(gateway: G, content: C, config: ClientConfig) -> Self {
        Self {
            gateway,
            content,
            connection: Connection::Disconnected,
            config,
        }
    }

    /// Attach a signer. Replaces any previous connection wholesale.
    pub fn connect(&mut self, signer: S) {
        self.connection = Connection::Connected { signer };
        info!(address = ?self.connection.address(), "client connected");
    }

    /// Detach the signer. Reads keep working.
    pub fn disconnect(&mut self) {
        self.connection = Connection::Disconnected;
        info!("client disconnected");
    }

    /// The connected address, if any.
    pub fn address(&self) -> Option<Address> {
        self.connection.address()
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The underlying gateway, for direct reads and test setup.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// The underlying content store.
    pub fn content(&self) -> &C {
        &self.content
    }

    fn signer(&self) -> Result<&S, ClientError> {
        self.connection.signer().ok_or(ClientError::NotConnected)
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// The materialized view of a job.
    pub async fn get_job(&self, id: JobId) -> Result<Job, ClientError> {
        let events = self.gateway.job_events(id).await?;
        if events.is_empty() {
            return Err(ClientError::JobNotFound(id));
        }
        Ok(Job::from_events(id, &events)?)
    }

    /// The raw ordered event log of a job.
    pub async fn get_events(&self, id: JobId) -> Result<Vec<JobEvent>, ClientError> {
        let events = self.gateway.job_events(id).await?;
        if events.is_empty() {
            return Err(ClientError::JobNotFound(id));
        }
        Ok(events)
    }

    /// All jobs, folded from their logs in id order.
    pub async fn get_jobs(&self) -> Result<Vec<Job>, ClientError> {
        let count = self.gateway.job_count().await?;
        let mut jobs = Vec::with_capacity(count as usize);
        for n in 1..=count {
            jobs.push(self.get_job(JobId(n)).await?);
        }
        Ok(jobs)
    }

    /// The user profile registered at an address, if any.
    pub async fn get_user(&self, address: Address) -> Result<Option<UserProfile>, ClientError> {
        Ok(self.gateway.user(address).await?)
    }

    /// The arbitrator profile registered at an address, if any.
    pub async fn get_arbitrator(
        &self,
        address: Address,
    ) -> Result<Option<ArbitratorProfile>, ClientError> {
        Ok(self.gateway.arbitrator(address).await?)
    }

    /// Fetch content from the store by digest, integrity-checked.
    pub async fn get_content(&self, digest: &ContentDigest) -> Result<Vec<u8>, ClientError> {
        Ok(self.content.get(digest).await?)
    }

    /// Block until a submitted transaction finalizes.
    pub async fn wait(&self, tx: &PendingTx) -> Result<TxReceipt, ClientError> {
        Ok(self.gateway.wait(tx).await?)
    }

    // ── Job writes ───────────────────────────────────────────────────

    /// Publish a new job. Stores the description, validates the creation
    /// locally, and submits.
    pub async fn publish_job(&self, spec: JobSpec) -> Result<PendingTx, ClientError> {
        let sender = self.signer()?.address();
        let content_hash = self.content.put(&spec.description).await?;
        let kind = JobEventKind::Created {
            title: spec.title,
            content_hash,
            category: spec.category,
            tags: spec.tags,
            token: spec.token,
            amount: spec.amount,
            max_time: spec.max_time,
            arbitrator: spec.arbitrator,
            multiple_applicants: spec.multiple_applicants,
            whitelist_workers: spec.whitelist_workers,
        };
        // A one-event fold runs the same creation checks the ledger will.
        Job::from_events(JobId(0), &[JobEvent::new(kind.clone(), sender)])?;
        self.submit(Self::create_tx(kind), sender).await
    }

    fn create_tx(kind: JobEventKind) -> TxKind {
        match kind {
            JobEventKind::Created {
                title,
                content_hash,
                category,
                tags,
                token,
                amount,
                max_time,
                arbitrator,
                multiple_applicants,
                whitelist_workers,
            } => TxKind::CreateJob {
                title,
                content_hash,
                category,
                tags,
                token,
                amount,
                max_time,
                arbitrator,
                multiple_applicants,
                whitelist_workers,
            },
            _ => unreachable!("create_tx is only called with Created"),
        }
    }

    /// Revise an Open job's terms.
    pub async fn update_job(
        &self,
        job_id: JobId,
        update: JobUpdate,
    ) -> Result<PendingTx, ClientError> {
        let sender = self.signer()?.address();
        let content_hash = self.content.put(&update.description).await?;
        let kind = JobEventKind::Updated {
            title: update.title.clone(),
            content_hash,
            amount: update.amount,
            max_time: update.max_time,
            arbitrator: update.arbitrator,
        };
        self.validate(job_id, &kind, sender).await?;
        self.submit(
            TxKind::UpdateJob {
                job_id,
                title: update.title,
                content_hash,
                amount: update.amount,
                max_time: update.max_time,
                arbitrator: update.arbitrator,
            },
            sender,
        )
        .await
    }

    /// Claim a job. Signs a take authorization bound to the job's current
    /// event count; a concurrent take invalidates it and the ledger rejects
    /// with a stale-signature revert.
    pub async fn take_job(&self, job_id: JobId) -> Result<PendingTx, ClientError> {
        let signer = self.signer()?;
        let sender = signer.address();
        let job = self.get_job(job_id).await?;
        // Escrow ids are assigned ledger-side; validation ignores the value.
        job.validate(
            &JobEventKind::Taken {
                escrow_id: EscrowId(0),
            },
            sender,
            Timestamp::now(),
        )?;
        let authorization = TakeAuthorization::sign(signer, job_id, job.events_length())?;
        debug!(%job_id, events_length = job.events_length(), "take authorization signed");
        self.submit(
            TxKind::TakeJob {
                job_id,
                authorization,
            },
            sender,
        )
        .await
    }

    /// Submit a result for a taken job. Stores the result bytes first.
    pub async fn deliver_result(
        &self,
        job_id: JobId,
        result: &[u8],
    ) -> Result<PendingTx, ClientError> {
        let sender = self.signer()?.address();
        let result_hash = self.content.put(result).await?;
        self.validate(job_id, &JobEventKind::Delivered { result_hash }, sender)
            .await?;
        self.submit(
            TxKind::DeliverResult {
                job_id,
                result_hash,
            },
            sender,
        )
        .await
    }

    /// Accept the delivered result, optionally rating the worker.
    pub async fn approve_result(
        &self,
        job_id: JobId,
        rating: Option<u8>,
    ) -> Result<PendingTx, ClientError> {
        let sender = self.signer()?.address();
        self.validate(job_id, &JobEventKind::Approved { rating }, sender)
            .await?;
        self.submit(TxKind::ApproveResult { job_id, rating }, sender)
            .await
    }

    /// Return escrow and release the job back to Open. Callable by the
    /// worker at any time, or by the creator after the delivery window.
    pub async fn refund(&self, job_id: JobId) -> Result<PendingTx, ClientError> {
        let sender = self.signer()?.address();
        let job = self.get_job(job_id).await?;
        let by_timeout = job.role_of(sender) != openwork_lifecycle::CallerRole::Worker;
        job.validate(
            &JobEventKind::Refunded { by_timeout },
            sender,
            Timestamp::now(),
        )?;
        self.submit(TxKind::Refund { job_id }, sender).await
    }

    /// Raise a dispute, optionally attaching a statement.
    pub async fn dispute(
        &self,
        job_id: JobId,
        statement: Option<&[u8]>,
    ) -> Result<PendingTx, ClientError> {
        let sender = self.signer()?.address();
        let content_hash = match statement {
            Some(bytes) => Some(self.content.put(bytes).await?),
            None => None,
        };
        self.validate(job_id, &JobEventKind::Disputed { content_hash }, sender)
            .await?;
        self.submit(TxKind::Dispute { job_id, content_hash }, sender)
            .await
    }

    /// Resolve a dispute, splitting escrow by percentage.
    pub async fn arbitrate(
        &self,
        job_id: JobId,
        creator_share: u8,
        worker_share: u8,
        reason: Option<&[u8]>,
    ) -> Result<PendingTx, ClientError> {
        let sender = self.signer()?.address();
        let reason_hash = match reason {
            Some(bytes) => Some(self.content.put(bytes).await?),
            None => None,
        };
        self.validate(
            job_id,
            &JobEventKind::Arbitrated {
                creator_share,
                worker_share,
                reason_hash,
            },
            sender,
        )
        .await?;
        self.submit(
            TxKind::Arbitrate {
                job_id,
                creator_share,
                worker_share,
                reason_hash,
            },
            sender,
        )
        .await
    }

    /// Decline to arbitrate a dispute.
    pub async fn refuse_arbitration(&self, job_id: JobId) -> Result<PendingTx, ClientError> {
        let sender = self.signer()?.address();
        self.validate(job_id, &JobEventKind::ArbitrationRefused, sender)
            .await?;
        self.submit(TxKind::RefuseArbitration { job_id }, sender)
            .await
    }

    /// Close an Open job without work done.
    pub async fn close_job(&self, job_id: JobId) -> Result<PendingTx, ClientError> {
        let sender = self.signer()?.address();
        self.validate(job_id, &JobEventKind::Closed, sender).await?;
        self.submit(TxKind::CloseJob { job_id }, sender).await
    }

    /// Reopen a job closed without a worker.
    pub async fn reopen_job(&self, job_id: JobId) -> Result<PendingTx, ClientError> {
        let sender = self.signer()?.address();
        self.validate(job_id, &JobEventKind::Reopened, sender).await?;
        self.submit(TxKind::ReopenJob { job_id }, sender).await
    }

    /// Withdraw collateral owed after a close.
    pub async fn withdraw_collateral(&self, job_id: JobId) -> Result<PendingTx, ClientError> {
        let sender = self.signer()?.address();
        self.validate(job_id, &JobEventKind::CollateralWithdrawn, sender)
            .await?;
        self.submit(TxKind::WithdrawCollateral { job_id }, sender)
            .await
    }

    /// Rate a completed, unrated job after the fact.
    pub async fn review(&self, job_id: JobId, rating: u8) -> Result<PendingTx, ClientError> {
        let sender = self.signer()?.address();
        self.validate(job_id, &JobEventKind::Rated { rating }, sender)
            .await?;
        self.submit(TxKind::Review { job_id, rating }, sender).await
    }

    /// Whitelist a worker on an Open job.
    pub async fn add_to_whitelist(
        &self,
        job_id: JobId,
        worker: Address,
    ) -> Result<PendingTx, ClientError> {
        let sender = self.signer()?.address();
        self.validate(job_id, &JobEventKind::WhitelistedWorkerAdded { worker }, sender)
            .await?;
        self.submit(TxKind::WhitelistAdd { job_id, worker }, sender)
            .await
    }

    /// Remove a worker from an Open job's whitelist.
    pub async fn remove_from_whitelist(
        &self,
        job_id: JobId,
        worker: Address,
    ) -> Result<PendingTx, ClientError> {
        let sender = self.signer()?.address();
        self.validate(
            job_id,
            &JobEventKind::WhitelistedWorkerRemoved { worker },
            sender,
        )
        .await?;
        self.submit(TxKind::WhitelistRemove { job_id, worker }, sender)
            .await
    }

    /// Post a message on a job. The sender's role picks the message side:
    /// the creator posts owner messages, everyone else worker messages.
    pub async fn post_message(
        &self,
        job_id: JobId,
        body: &[u8],
        recipient: Address,
    ) -> Result<PendingTx, ClientError> {
        let sender = self.signer()?.address();
        let content_hash = self.content.put(body).await?;
        let job = self.get_job(job_id).await?;
        let owner_side = job.role_of(sender) == openwork_lifecycle::CallerRole::Creator;
        let kind = if owner_side {
            JobEventKind::OwnerMessage {
                content_hash,
                recipient,
            }
        } else {
            JobEventKind::WorkerMessage {
                content_hash,
                recipient,
            }
        };
        job.validate(&kind, sender, Timestamp::now())?;
        let tx = if owner_side {
            TxKind::OwnerMessage {
                job_id,
                content_hash,
                recipient,
            }
        } else {
            TxKind::WorkerMessage {
                job_id,
                content_hash,
                recipient,
            }
        };
        self.submit(tx, sender).await
    }

    // ── Profile writes ───────────────────────────────────────────────

    /// Register the connected signer as a user.
    pub async fn register_user(
        &self,
        name: &str,
        bio: &str,
        avatar: Option<&[u8]>,
    ) -> Result<PendingTx, ClientError> {
        let signer = self.signer()?;
        let avatar_hash = match avatar {
            Some(bytes) => Some(self.content.put(bytes).await?),
            None => None,
        };
        // Runs the same field validation the ledger applies.
        UserProfile::new(signer.public_key(), name, bio, avatar_hash)?;
        self.submit(
            TxKind::RegisterUser {
                public_key: signer.public_key(),
                name: name.to_string(),
                bio: bio.to_string(),
                avatar_hash,
            },
            signer.address(),
        )
        .await
    }

    /// Update the connected user's mutable profile fields.
    pub async fn update_user(
        &self,
        name: &str,
        bio: &str,
        avatar: Option<&[u8]>,
    ) -> Result<PendingTx, ClientError> {
        let signer = self.signer()?;
        let avatar_hash = match avatar {
            Some(bytes) => Some(self.content.put(bytes).await?),
            None => None,
        };
        UserProfile::new(signer.public_key(), name, bio, avatar_hash)?;
        self.submit(
            TxKind::UpdateUser {
                name: name.to_string(),
                bio: bio.to_string(),
                avatar_hash,
            },
            signer.address(),
        )
        .await
    }

    /// Register the connected signer as an arbitrator.
    pub async fn register_arbitrator(
        &self,
        name: &str,
        bio: &str,
        avatar: Option<&[u8]>,
        fee_bps: u16,
    ) -> Result<PendingTx, ClientError> {
        let signer = self.signer()?;
        let avatar_hash = match avatar {
            Some(bytes) => Some(self.content.put(bytes).await?),
            None => None,
        };
        ArbitratorProfile::new(signer.public_key(), name, bio, avatar_hash, fee_bps)?;
        self.submit(
            TxKind::RegisterArbitrator {
                public_key: signer.public_key(),
                name: name.to_string(),
                bio: bio.to_string(),
                avatar_hash,
                fee_bps,
            },
            signer.address(),
        )
        .await
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Load the job and run the transition table against it locally.
    async fn validate(
        &self,
        job_id: JobId,
        kind: &JobEventKind,
        sender: Address,
    ) -> Result<(), ClientError> {
        let job = self.get_job(job_id).await?;
        job.validate(kind, sender, Timestamp::now())?;
        Ok(())
    }

    async fn submit(&self, kind: TxKind, sender: Address) -> Result<PendingTx, ClientError> {
        let op = kind.name();
        let pending = self.gateway.submit(TxRequest { kind, sender }).await?;
        info!(op, tx = %pending.id, %sender, "transaction submitted");
        Ok(pending)
    }
}
