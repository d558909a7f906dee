//! # In-Memory Ledger
//!
//! A process-local [`LedgerGateway`] for tests and local development. It
//! enforces the same rules a real ledger would: every submission is
//! validated through the lifecycle fold, take authorizations are verified
//! against the registered user's public key, and rejections surface as
//! `GatewayError::Reverted` with the reason.
//!
//! Transactions finalize synchronously inside `submit`; `wait` just looks
//! up the receipt.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use openwork_core::{Address, EscrowId, JobId, Timestamp};
use openwork_lifecycle::{
    ArbitratorProfile, CallerRole, Job, JobEvent, JobEventKind, UserProfile,
};
use tracing::debug;
use uuid::Uuid;

use crate::gateway::{GatewayError, LedgerGateway, PendingTx, TxKind, TxReceipt, TxRequest};

#[derive(Debug, Default)]
struct LedgerState {
    jobs: BTreeMap<JobId, Vec<JobEvent>>,
    users: HashMap<Address, UserProfile>,
    arbitrators: HashMap<Address, ArbitratorProfile>,
    receipts: HashMap<Uuid, TxReceipt>,
    next_escrow: u64,
}

/// An in-process marketplace ledger.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, LedgerState>, GatewayError> {
        self.state
            .lock()
            .map_err(|_| GatewayError::Network("ledger lock poisoned".into()))
    }

    fn execute(state: &mut LedgerState, tx: TxRequest) -> Result<TxReceipt, GatewayError> {
        let sender = tx.sender;
        match tx.kind {
            TxKind::CreateJob {
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
            } => {
                let id = JobId(state.jobs.len() as u64 + 1);
                let event = JobEvent::new(
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
                    },
                    sender,
                );
                Job::from_events(id, std::slice::from_ref(&event)).map_err(reverted)?;
                state.jobs.insert(id, vec![event]);
                debug!(%id, "job created");
                Ok(receipt(Some(id), Some(1)))
            }

            TxKind::UpdateJob {
                job_id,
                title,
                content_hash,
                amount,
                max_time,
                arbitrator,
            } => Self::apply_job_event(
                state,
                job_id,
                JobEventKind::Updated {
                    title,
                    content_hash,
                    amount,
                    max_time,
                    arbitrator,
                },
                sender,
            ),

            TxKind::TakeJob {
                job_id,
                authorization,
            } => {
                if authorization.job_id != job_id {
                    return Err(GatewayError::Reverted(
                        "authorization is for a different job".into(),
                    ));
                }
                let user = state
                    .users
                    .get(&sender)
                    .ok_or_else(|| GatewayError::Reverted("sender is not a registered user".into()))?;
                let job = Self::fold(state, job_id)?;
                authorization
                    .verify(job.events_length(), &user.public_key)
                    .map_err(reverted)?;
                let escrow_id = EscrowId(state.next_escrow + 1);
                let receipt =
                    Self::apply_job_event(state, job_id, JobEventKind::Taken { escrow_id }, sender)?;
                state.next_escrow += 1;
                Ok(receipt)
            }

            TxKind::DeliverResult {
                job_id,
                result_hash,
            } => Self::apply_job_event(
                state,
                job_id,
                JobEventKind::Delivered { result_hash },
                sender,
            ),

            TxKind::ApproveResult { job_id, rating } => {
                let worker = Self::fold(state, job_id)?.worker;
                let receipt = Self::apply_job_event(
                    state,
                    job_id,
                    JobEventKind::Approved { rating },
                    sender,
                )?;
                if let (Some(r), Some(worker)) = (rating, worker) {
                    if let Some(profile) = state.users.get_mut(&worker) {
                        profile.record_rating(r);
                    }
                }
                Ok(receipt)
            }

            TxKind::Refund { job_id } => {
                let by_timeout = Self::fold(state, job_id)?.role_of(sender) == CallerRole::Creator;
                Self::apply_job_event(state, job_id, JobEventKind::Refunded { by_timeout }, sender)
            }

            TxKind::Dispute {
                job_id,
                content_hash,
            } => Self::apply_job_event(
                state,
                job_id,
                JobEventKind::Disputed { content_hash },
                sender,
            ),

            TxKind::Arbitrate {
                job_id,
                creator_share,
                worker_share,
                reason_hash,
            } => {
                let receipt = Self::apply_job_event(
                    state,
                    job_id,
                    JobEventKind::Arbitrated {
                        creator_share,
                        worker_share,
                        reason_hash,
                    },
                    sender,
                )?;
                if let Some(profile) = state.arbitrators.get_mut(&sender) {
                    profile.settled_count += 1;
                }
                Ok(receipt)
            }

            TxKind::RefuseArbitration { job_id } => {
                let receipt = Self::apply_job_event(
                    state,
                    job_id,
                    JobEventKind::ArbitrationRefused,
                    sender,
                )?;
                if let Some(profile) = state.arbitrators.get_mut(&sender) {
                    profile.refused_count += 1;
                }
                Ok(receipt)
            }

            TxKind::CloseJob { job_id } => {
                Self::apply_job_event(state, job_id, JobEventKind::Closed, sender)
            }

            TxKind::ReopenJob { job_id } => {
                Self::apply_job_event(state, job_id, JobEventKind::Reopened, sender)
            }

            TxKind::WithdrawCollateral { job_id } => {
                Self::apply_job_event(state, job_id, JobEventKind::CollateralWithdrawn, sender)
            }

            TxKind::Review { job_id, rating } => {
                let worker = Self::fold(state, job_id)?.worker;
                let receipt = Self::apply_job_event(
                    state,
                    job_id,
                    JobEventKind::Rated { rating },
                    sender,
                )?;
                if let Some(profile) = worker.and_then(|w| state.users.get_mut(&w)) {
                    profile.record_rating(rating);
                }
                Ok(receipt)
            }

            TxKind::WhitelistAdd { job_id, worker } => Self::apply_job_event(
                state,
                job_id,
                JobEventKind::WhitelistedWorkerAdded { worker },
                sender,
            ),

            TxKind::WhitelistRemove { job_id, worker } => Self::apply_job_event(
                state,
                job_id,
                JobEventKind::WhitelistedWorkerRemoved { worker },
                sender,
            ),

            TxKind::OwnerMessage {
                job_id,
                content_hash,
                recipient,
            } => Self::apply_job_event(
                state,
                job_id,
                JobEventKind::OwnerMessage {
                    content_hash,
                    recipient,
                },
                sender,
            ),

            TxKind::WorkerMessage {
                job_id,
                content_hash,
                recipient,
            } => Self::apply_job_event(
                state,
                job_id,
                JobEventKind::WorkerMessage {
                    content_hash,
                    recipient,
                },
                sender,
            ),

            TxKind::RegisterUser {
                public_key,
                name,
                bio,
                avatar_hash,
            } => {
                let profile = UserProfile::new(public_key, name, bio, avatar_hash)
                    .map_err(reverted)?;
                if profile.address != sender {
                    return Err(GatewayError::Reverted(
                        "sender does not control the registered key".into(),
                    ));
                }
                if state.users.contains_key(&sender) {
                    return Err(GatewayError::Reverted("user already registered".into()));
                }
                state.users.insert(sender, profile);
                Ok(receipt(None, None))
            }

            TxKind::UpdateUser {
                name,
                bio,
                avatar_hash,
            } => {
                let profile = state
                    .users
                    .get_mut(&sender)
                    .ok_or_else(|| GatewayError::Reverted("user not registered".into()))?;
                profile.update(name, bio, avatar_hash).map_err(reverted)?;
                Ok(receipt(None, None))
            }

            TxKind::RegisterArbitrator {
                public_key,
                name,
                bio,
                avatar_hash,
                fee_bps,
            } => {
                let profile =
                    ArbitratorProfile::new(public_key, name, bio, avatar_hash, fee_bps)
                        .map_err(reverted)?;
                if profile.address != sender {
                    return Err(GatewayError::Reverted(
                        "sender does not control the registered key".into(),
                    ));
                }
                if state.arbitrators.contains_key(&sender) {
                    return Err(GatewayError::Reverted(
                        "arbitrator already registered".into(),
                    ));
                }
                state.arbitrators.insert(sender, profile);
                Ok(receipt(None, None))
            }
        }
    }

    fn fold(state: &LedgerState, job_id: JobId) -> Result<Job, GatewayError> {
        let events = state
            .jobs
            .get(&job_id)
            .ok_or_else(|| GatewayError::Reverted(format!("no such job: {job_id}")))?;
        Job::from_events(job_id, events).map_err(reverted)
    }

    fn apply_job_event(
        state: &mut LedgerState,
        job_id: JobId,
        kind: JobEventKind,
        sender: Address,
    ) -> Result<TxReceipt, GatewayError> {
        let mut job = Self::fold(state, job_id)?;
        let event = JobEvent::new(kind, sender);
        job.apply(event.clone()).map_err(reverted)?;
        let log = state
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| GatewayError::Reverted(format!("no such job: {job_id}")))?;
        log.push(event);
        Ok(receipt(Some(job_id), Some(log.len() as u64)))
    }
}

fn reverted(err: impl std::fmt::Display) -> GatewayError {
    GatewayError::Reverted(err.to_string())
}

fn receipt(job_id: Option<JobId>, events_length: Option<u64>) -> TxReceipt {
    TxReceipt {
        tx_id: Uuid::nil(), // filled in by submit
        job_id,
        events_length,
    }
}

impl LedgerGateway for InMemoryLedger {
    async fn job_count(&self) -> Result<u64, GatewayError> {
        Ok(self.lock()?.jobs.len() as u64)
    }

    async fn job_events(&self, id: JobId) -> Result<Vec<JobEvent>, GatewayError> {
        Ok(self.lock()?.jobs.get(&id).cloned().unwrap_or_default())
    }

    async fn user(&self, address: Address) -> Result<Option<UserProfile>, GatewayError> {
        Ok(self.lock()?.users.get(&address).cloned())
    }

    async fn arbitrator(
        &self,
        address: Address,
    ) -> Result<Option<ArbitratorProfile>, GatewayError> {
        Ok(self.lock()?.arbitrators.get(&address).cloned())
    }

    async fn submit(&self, tx: TxRequest) -> Result<PendingTx, GatewayError> {
        let mut state = self.lock()?;
        let op = tx.kind.name();
        let mut receipt = Self::execute(&mut state, tx)?;
        let pending = PendingTx {
            id: Uuid::new_v4(),
            submitted_at: Timestamp::now(),
        };
        receipt.tx_id = pending.id;
        state.receipts.insert(pending.id, receipt);
        debug!(op, tx = %pending.id, "transaction finalized");
        Ok(pending)
    }

    async fn wait(&self, tx: &PendingTx) -> Result<TxReceipt, GatewayError> {
        self.lock()?
            .receipts
            .get(&tx.id)
            .cloned()
            .ok_or_else(|| GatewayError::Network(format!("unknown transaction: {}", tx.id)))
    }
}
