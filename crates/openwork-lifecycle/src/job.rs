//! # Job — Materialized View of an Event Log
//!
//! A `Job` is derived state: every field is the result of folding the job's
//! ordered event sequence, starting from a `Created` event. The fold
//! validates each event before applying it, so a log handed back by a
//! ledger that violates the transition table surfaces a structured error
//! instead of silently materializing a bad view.
//!
//! The event log is append-only and private; the only mutation path is
//! [`Job::apply`], which validates, folds, then appends.

use std::collections::BTreeSet;

use openwork_core::{Address, ContentDigest, EscrowId, JobId, Timestamp};
use serde::Serialize;

use crate::category::{Category, Tag};
use crate::error::LifecycleError;
use crate::event::{JobEvent, JobEventKind};
use crate::state::{CallerRole, JobState};

/// A marketplace job, derived by folding its event log.
///
/// Not `Deserialize` — a `Job` can only be obtained through
/// [`Job::from_events`] or built up via [`Job::apply`], so every instance
/// is consistent with some valid event sequence.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    /// Ledger-assigned identifier, immutable once created.
    pub id: JobId,
    /// Current lifecycle state.
    pub state: JobState,
    /// The address that published the job.
    pub creator: Address,
    /// The worker currently holding the job. Unset while Open; set exactly
    /// once per Take; cleared again by Refund.
    pub worker: Option<Address>,
    /// Arbitrator fixed at creation; may be revised while Open via Updated.
    pub arbitrator: Option<Address>,
    /// Short human-readable title.
    pub title: String,
    /// Digest of the job description in the content store.
    pub content_hash: ContentDigest,
    /// Digest of the latest delivered result, if any.
    pub result_hash: Option<ContentDigest>,
    /// The single MECE category.
    pub category: Category,
    /// Free-form search tags.
    pub tags: Vec<Tag>,
    /// Token the escrow is denominated in.
    pub token: Address,
    /// Escrowed amount, in the token's smallest unit.
    pub amount: u128,
    /// Delivery window in seconds, measured from the Take event.
    pub max_time: u64,
    /// Whether multiple workers may apply before one takes the job.
    pub multiple_applicants: bool,
    /// Whether Take is gated on the whitelist set.
    pub whitelist_workers: bool,
    /// Event-sourced whitelist membership, replayed in event order.
    pub whitelist: BTreeSet<Address>,
    /// Dispute flag. `true` implies the job is Taken.
    pub disputed: bool,
    /// 1–5 rating, or 0 until reviewed.
    pub rating: u8,
    /// Escrow owed back to the creator after a close or arbitration split.
    pub collateral_owed: u128,
    /// Escrow account backing the current take, if any.
    pub escrow_id: Option<EscrowId>,
    /// Ledger time of the Created event.
    pub created_at: Timestamp,
    /// Ledger time of the current Take, if any.
    pub taken_at: Option<Timestamp>,
    events: Vec<JobEvent>,
}

impl Job {
    /// Fold a full event log into a job.
    ///
    /// The first event must be `Created`; every subsequent event is
    /// validated against the state accumulated so far. Replaying the same
    /// sequence always yields the same job.
    pub fn from_events(id: JobId, events: &[JobEvent]) -> Result<Self, LifecycleError> {
        let (first, rest) = events.split_first().ok_or(LifecycleError::MissingCreated)?;
        let mut job = Self::create(id, first)?;
        for event in rest {
            job.apply(event.clone())?;
        }
        Ok(job)
    }

    /// Materialize the initial view from a `Created` event.
    fn create(id: JobId, event: &JobEvent) -> Result<Self, LifecycleError> {
        let JobEventKind::Created {
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
        } = &event.kind
        else {
            return Err(LifecycleError::MissingCreated);
        };
        if *amount == 0 {
            return Err(LifecycleError::ZeroAmount);
        }
        Ok(Self {
            id,
            state: JobState::Open,
            creator: event.actor,
            worker: None,
            arbitrator: *arbitrator,
            title: title.clone(),
            content_hash: *content_hash,
            result_hash: None,
            category: *category,
            tags: tags.clone(),
            token: *token,
            amount: *amount,
            max_time: *max_time,
            multiple_applicants: *multiple_applicants,
            whitelist_workers: *whitelist_workers,
            whitelist: BTreeSet::new(),
            disputed: false,
            rating: 0,
            collateral_owed: 0,
            escrow_id: None,
            created_at: event.timestamp,
            taken_at: None,
            events: vec![event.clone()],
        })
    }

    /// The ordered event log this view was folded from.
    pub fn events(&self) -> &[JobEvent] {
        &self.events
    }

    /// The event count — the value a take authorization must be signed
    /// against.
    ///
    /// Counts every event including `Created`, so a freshly published job
    /// reports 1, not 0. Signers must read the count from the job they
    /// observe rather than assuming a starting value.
    pub fn events_length(&self) -> u64 {
        self.events.len() as u64
    }

    /// The role `addr` holds on this job.
    pub fn role_of(&self, addr: Address) -> CallerRole {
        if addr == self.creator {
            CallerRole::Creator
        } else if self.worker == Some(addr) {
            CallerRole::Worker
        } else if self.arbitrator == Some(addr) {
            CallerRole::Arbitrator
        } else {
            CallerRole::Other
        }
    }

    /// Validate an event, then fold it and append it to the log.
    pub fn apply(&mut self, event: JobEvent) -> Result<(), LifecycleError> {
        self.validate(&event.kind, event.actor, event.timestamp)?;
        self.fold(&event);
        self.events.push(event);
        Ok(())
    }

    /// Check the transition table without mutating anything.
    ///
    /// `at` is the ledger time of the attempted event; it only matters for
    /// the creator-side refund timeout.
    pub fn validate(
        &self,
        kind: &JobEventKind,
        actor: Address,
        at: Timestamp,
    ) -> Result<(), LifecycleError> {
        let role = self.role_of(actor);
        match kind {
            JobEventKind::Created { .. } => Err(LifecycleError::UnexpectedCreated),

            JobEventKind::Updated { amount, .. } => {
                self.require(kind, role, JobState::Open, CallerRole::Creator)?;
                if *amount == 0 {
                    return Err(LifecycleError::ZeroAmount);
                }
                Ok(())
            }

            JobEventKind::Taken { .. } => {
                if self.state != JobState::Open {
                    return Err(self.rejected(kind, role, "job is not open"));
                }
                if role == CallerRole::Creator {
                    return Err(self.rejected(kind, role, "creator cannot take own job"));
                }
                if self.multiple_applicants
                    && self.whitelist_workers
                    && !self.whitelist.contains(&actor)
                {
                    return Err(self.rejected(kind, role, "worker is not whitelisted"));
                }
                Ok(())
            }

            JobEventKind::Delivered { .. } => {
                self.require(kind, role, JobState::Taken, CallerRole::Worker)
            }

            JobEventKind::Approved { rating } => {
                self.require(kind, role, JobState::Taken, CallerRole::Creator)?;
                if self.result_hash.is_none() {
                    return Err(self.rejected(kind, role, "no result delivered"));
                }
                if let Some(r) = rating {
                    if !(1..=5).contains(r) {
                        return Err(LifecycleError::InvalidRating(*r));
                    }
                }
                Ok(())
            }

            JobEventKind::Rated { rating } => {
                self.require(kind, role, JobState::Closed, CallerRole::Creator)?;
                if self.worker.is_none() {
                    return Err(self.rejected(kind, role, "no worker to rate"));
                }
                if self.rating != 0 {
                    return Err(self.rejected(kind, role, "job already rated"));
                }
                if !(1..=5).contains(rating) {
                    return Err(LifecycleError::InvalidRating(*rating));
                }
                Ok(())
            }

            JobEventKind::Refunded { .. } => {
                if self.state != JobState::Taken {
                    return Err(self.rejected(kind, role, "job is not taken"));
                }
                match role {
                    CallerRole::Worker => Ok(()),
                    CallerRole::Creator => {
                        let taken_at = self
                            .taken_at
                            .ok_or_else(|| self.rejected(kind, role, "job has no take time"))?;
                        if at.seconds_since(taken_at) < self.max_time {
                            return Err(self.rejected(
                                kind,
                                role,
                                "delivery window has not elapsed",
                            ));
                        }
                        Ok(())
                    }
                    _ => Err(self.rejected(kind, role, "only the worker or the creator after timeout may refund")),
                }
            }

            JobEventKind::Disputed { .. } => {
                if self.state != JobState::Taken {
                    return Err(self.rejected(kind, role, "job is not taken"));
                }
                if !matches!(role, CallerRole::Creator | CallerRole::Worker) {
                    return Err(self.rejected(kind, role, "only creator or worker may dispute"));
                }
                if self.disputed {
                    return Err(self.rejected(kind, role, "job is already disputed"));
                }
                if self.arbitrator.is_none() {
                    return Err(self.rejected(kind, role, "job has no arbitrator"));
                }
                Ok(())
            }

            JobEventKind::Arbitrated {
                creator_share,
                worker_share,
                ..
            } => {
                self.require(kind, role, JobState::Taken, CallerRole::Arbitrator)?;
                if !self.disputed {
                    return Err(self.rejected(kind, role, "job is not disputed"));
                }
                if creator_share.checked_add(*worker_share) != Some(100) {
                    return Err(LifecycleError::InvalidShares {
                        creator_share: *creator_share,
                        worker_share: *worker_share,
                    });
                }
                Ok(())
            }

            JobEventKind::ArbitrationRefused => {
                self.require(kind, role, JobState::Taken, CallerRole::Arbitrator)?;
                if !self.disputed {
                    return Err(self.rejected(kind, role, "job is not disputed"));
                }
                Ok(())
            }

            JobEventKind::Closed => self.require(kind, role, JobState::Open, CallerRole::Creator),

            JobEventKind::Reopened => {
                self.require(kind, role, JobState::Closed, CallerRole::Creator)?;
                if self.worker.is_some() {
                    return Err(self.rejected(kind, role, "job was completed by a worker"));
                }
                Ok(())
            }

            JobEventKind::CollateralWithdrawn => {
                self.require(kind, role, JobState::Closed, CallerRole::Creator)?;
                if self.collateral_owed == 0 {
                    return Err(self.rejected(kind, role, "no collateral owed"));
                }
                Ok(())
            }

            JobEventKind::WhitelistedWorkerAdded { .. }
            | JobEventKind::WhitelistedWorkerRemoved { .. } => {
                self.require(kind, role, JobState::Open, CallerRole::Creator)
            }

            JobEventKind::OwnerMessage { .. } => {
                if self.state == JobState::Closed {
                    return Err(self.rejected(kind, role, "job is closed"));
                }
                if role != CallerRole::Creator {
                    return Err(self.rejected(kind, role, "only the creator posts owner messages"));
                }
                Ok(())
            }

            JobEventKind::WorkerMessage { recipient, .. } => {
                if self.state == JobState::Closed {
                    return Err(self.rejected(kind, role, "job is closed"));
                }
                if role == CallerRole::Creator {
                    return Err(self.rejected(kind, role, "creator posts owner messages"));
                }
                match self.state {
                    // While Open anyone may write, but only to the creator.
                    JobState::Open if *recipient != self.creator => Err(self.rejected(
                        kind,
                        role,
                        "open-job messages must target the creator",
                    )),
                    JobState::Taken
                        if !matches!(role, CallerRole::Worker | CallerRole::Arbitrator) =>
                    {
                        Err(self.rejected(kind, role, "only participants may message a taken job"))
                    }
                    _ => Ok(()),
                }
            }
        }
    }

    /// Mutate the materialized view for an already-validated event.
    fn fold(&mut self, event: &JobEvent) {
        match &event.kind {
            // Created is consumed by `create()`; validate() rejects it here.
            JobEventKind::Created { .. } => {}

            JobEventKind::Updated {
                title,
                content_hash,
                amount,
                max_time,
                arbitrator,
            } => {
                self.title = title.clone();
                self.content_hash = *content_hash;
                self.amount = *amount;
                self.max_time = *max_time;
                self.arbitrator = *arbitrator;
            }

            JobEventKind::Taken { escrow_id } => {
                self.state = JobState::Taken;
                self.worker = Some(event.actor);
                self.escrow_id = Some(*escrow_id);
                self.taken_at = Some(event.timestamp);
            }

            JobEventKind::Delivered { result_hash } => {
                self.result_hash = Some(*result_hash);
            }

            JobEventKind::Approved { rating } => {
                self.state = JobState::Closed;
                if let Some(r) = rating {
                    self.rating = *r;
                }
            }

            JobEventKind::Rated { rating } => {
                self.rating = *rating;
            }

            JobEventKind::Refunded { .. } => {
                self.state = JobState::Open;
                if let Some(worker) = self.worker.take() {
                    self.whitelist.remove(&worker);
                }
                self.taken_at = None;
                self.escrow_id = None;
                // The next worker starts clean.
                self.result_hash = None;
            }

            JobEventKind::Disputed { .. } => {
                self.disputed = true;
            }

            JobEventKind::Arbitrated { creator_share, .. } => {
                self.disputed = false;
                self.state = JobState::Closed;
                self.collateral_owed = percentage_of(self.amount, *creator_share);
            }

            JobEventKind::ArbitrationRefused => {
                // The arbitrator stays appointed; either party may dispute
                // again. The refusal itself is recorded in the event log and
                // on the arbitrator's profile.
                self.disputed = false;
            }

            JobEventKind::Closed => {
                self.state = JobState::Closed;
                self.collateral_owed = self.amount;
            }

            JobEventKind::Reopened => {
                self.state = JobState::Open;
                self.collateral_owed = 0;
            }

            JobEventKind::CollateralWithdrawn => {
                self.collateral_owed = 0;
            }

            JobEventKind::WhitelistedWorkerAdded { worker } => {
                self.whitelist.insert(*worker);
            }

            JobEventKind::WhitelistedWorkerRemoved { worker } => {
                self.whitelist.remove(worker);
            }

            JobEventKind::OwnerMessage { .. } | JobEventKind::WorkerMessage { .. } => {}
        }
    }

    fn require(
        &self,
        kind: &JobEventKind,
        role: CallerRole,
        state: JobState,
        required_role: CallerRole,
    ) -> Result<(), LifecycleError> {
        if self.state != state {
            return Err(self.rejected(kind, role, format!("job is not {state}").to_lowercase()));
        }
        if role != required_role {
            return Err(self.rejected(kind, role, format!("caller must be the {required_role}")));
        }
        Ok(())
    }

    fn rejected(
        &self,
        kind: &JobEventKind,
        role: CallerRole,
        reason: impl Into<String>,
    ) -> LifecycleError {
        LifecycleError::InvalidTransition {
            state: self.state,
            event: kind.name(),
            role,
            reason: reason.into(),
        }
    }
}

/// Integer percentage split, exact and overflow-free for any `u128` amount.
///
/// `amount * share` can exceed `u128::MAX` for escrow amounts above
/// `u128::MAX / 100`; splitting the division first keeps every intermediate
/// within range while producing the same floor result.
fn percentage_of(amount: u128, share: u8) -> u128 {
    let share = u128::from(share);
    amount / 100 * share + amount % 100 * share / 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use openwork_core::sha256_bytes;

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_epoch_secs(secs).unwrap()
    }

    const CREATOR: u8 = 1;
    const WORKER: u8 = 2;
    const ARBITRATOR: u8 = 3;

    fn created_kind() -> JobEventKind {
        JobEventKind::Created {
            title: "Transcribe a podcast episode".into(),
            content_hash: sha256_bytes(b"job description"),
            category: Category::DigitalAudio,
            tags: vec![Tag::new("transcription")],
            token: addr(0xee),
            amount: 2_000_000_000_000_000_000, // 2 ETH in wei
            max_time: 3600,
            arbitrator: Some(addr(ARBITRATOR)),
            multiple_applicants: true,
            whitelist_workers: false,
        }
    }

    fn open_job() -> Job {
        Job::from_events(
            JobId(1),
            &[JobEvent::at(created_kind(), addr(CREATOR), ts(1000))],
        )
        .unwrap()
    }

    fn taken_job() -> Job {
        let mut job = open_job();
        job.apply(JobEvent::at(
            JobEventKind::Taken {
                escrow_id: EscrowId(1),
            },
            addr(WORKER),
            ts(1010),
        ))
        .unwrap();
        job
    }

    fn delivered_job() -> Job {
        let mut job = taken_job();
        job.apply(JobEvent::at(
            JobEventKind::Delivered {
                result_hash: sha256_bytes(b"transcript"),
            },
            addr(WORKER),
            ts(1020),
        ))
        .unwrap();
        job
    }

    // ── Creation ─────────────────────────────────────────────────────

    #[test]
    fn test_created_job_is_open() {
        let job = open_job();
        assert_eq!(job.state, JobState::Open);
        assert_eq!(job.creator, addr(CREATOR));
        assert_eq!(job.worker, None);
        assert_eq!(job.events_length(), 1);
        assert!(!job.disputed);
    }

    #[test]
    fn test_empty_log_rejected() {
        assert_eq!(
            Job::from_events(JobId(1), &[]).unwrap_err(),
            LifecycleError::MissingCreated
        );
    }

    #[test]
    fn test_log_not_starting_with_created_rejected() {
        let events = [JobEvent::at(JobEventKind::Closed, addr(CREATOR), ts(1000))];
        assert_eq!(
            Job::from_events(JobId(1), &events).unwrap_err(),
            LifecycleError::MissingCreated
        );
    }

    #[test]
    fn test_second_created_rejected() {
        let mut job = open_job();
        let err = job
            .apply(JobEvent::at(created_kind(), addr(CREATOR), ts(1001)))
            .unwrap_err();
        assert_eq!(err, LifecycleError::UnexpectedCreated);
    }

    #[test]
    fn test_zero_amount_rejected() {
        let kind = JobEventKind::Created {
            title: "Free work".into(),
            content_hash: sha256_bytes(b"free"),
            category: Category::DigitalOther,
            tags: vec![],
            token: addr(0xee),
            amount: 0,
            max_time: 3600,
            arbitrator: None,
            multiple_applicants: false,
            whitelist_workers: false,
        };
        let events = [JobEvent::at(kind, addr(CREATOR), ts(1000))];
        assert_eq!(
            Job::from_events(JobId(1), &events).unwrap_err(),
            LifecycleError::ZeroAmount
        );
    }

    // ── Take ─────────────────────────────────────────────────────────

    #[test]
    fn test_take_sets_worker_and_escrow() {
        let job = taken_job();
        assert_eq!(job.state, JobState::Taken);
        assert_eq!(job.worker, Some(addr(WORKER)));
        assert_eq!(job.escrow_id, Some(EscrowId(1)));
        assert_eq!(job.taken_at, Some(ts(1010)));
    }

    #[test]
    fn test_creator_cannot_take_own_job() {
        let mut job = open_job();
        let err = job
            .apply(JobEvent::at(
                JobEventKind::Taken {
                    escrow_id: EscrowId(1),
                },
                addr(CREATOR),
                ts(1010),
            ))
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidTransition {
                role: CallerRole::Creator,
                event: "Taken",
                ..
            }
        ));
    }

    #[test]
    fn test_take_on_taken_job_rejected() {
        let mut job = taken_job();
        let err = job
            .apply(JobEvent::at(
                JobEventKind::Taken {
                    escrow_id: EscrowId(2),
                },
                addr(WORKER),
                ts(1011),
            ))
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidTransition {
                state: JobState::Taken,
                event: "Taken",
                ..
            }
        ));
    }

    // ── Whitelist gating ─────────────────────────────────────────────

    fn whitelisted_open_job() -> Job {
        let kind = JobEventKind::Created {
            title: "Gated job".into(),
            content_hash: sha256_bytes(b"gated"),
            category: Category::DigitalSoftware,
            tags: vec![],
            token: addr(0xee),
            amount: 1_000,
            max_time: 3600,
            arbitrator: None,
            multiple_applicants: true,
            whitelist_workers: true,
        };
        Job::from_events(JobId(2), &[JobEvent::at(kind, addr(CREATOR), ts(1000))]).unwrap()
    }

    #[test]
    fn test_unwhitelisted_worker_cannot_take() {
        let mut job = whitelisted_open_job();
        let err = job
            .apply(JobEvent::at(
                JobEventKind::Taken {
                    escrow_id: EscrowId(1),
                },
                addr(WORKER),
                ts(1010),
            ))
            .unwrap_err();
        assert!(err.to_string().contains("not whitelisted"));
    }

    #[test]
    fn test_whitelisted_worker_can_take_after_add() {
        let mut job = whitelisted_open_job();
        job.apply(JobEvent::at(
            JobEventKind::WhitelistedWorkerAdded {
                worker: addr(WORKER),
            },
            addr(CREATOR),
            ts(1005),
        ))
        .unwrap();
        job.apply(JobEvent::at(
            JobEventKind::Taken {
                escrow_id: EscrowId(1),
            },
            addr(WORKER),
            ts(1010),
        ))
        .unwrap();
        assert_eq!(job.worker, Some(addr(WORKER)));
    }

    #[test]
    fn test_whitelist_is_fold_of_add_remove_order() {
        let mut job = whitelisted_open_job();
        let a = addr(10);
        let b = addr(11);
        let steps = [
            (JobEventKind::WhitelistedWorkerAdded { worker: a }, 1001),
            (JobEventKind::WhitelistedWorkerAdded { worker: b }, 1002),
            (JobEventKind::WhitelistedWorkerRemoved { worker: a }, 1003),
            (JobEventKind::WhitelistedWorkerAdded { worker: a }, 1004),
            (JobEventKind::WhitelistedWorkerRemoved { worker: b }, 1005),
        ];
        for (kind, at) in steps {
            job.apply(JobEvent::at(kind, addr(CREATOR), ts(at))).unwrap();
        }
        assert!(job.whitelist.contains(&a));
        assert!(!job.whitelist.contains(&b));
        assert_eq!(job.whitelist.len(), 1);
    }

    #[test]
    fn test_only_creator_mutates_whitelist() {
        let mut job = whitelisted_open_job();
        let err = job
            .apply(JobEvent::at(
                JobEventKind::WhitelistedWorkerAdded {
                    worker: addr(WORKER),
                },
                addr(WORKER),
                ts(1001),
            ))
            .unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
    }

    // ── Deliver / Approve / Rate ─────────────────────────────────────

    #[test]
    fn test_deliver_records_result_without_state_change() {
        let job = delivered_job();
        assert_eq!(job.state, JobState::Taken);
        assert_eq!(job.result_hash, Some(sha256_bytes(b"transcript")));
    }

    #[test]
    fn test_only_worker_delivers() {
        let mut job = taken_job();
        let err = job
            .apply(JobEvent::at(
                JobEventKind::Delivered {
                    result_hash: sha256_bytes(b"x"),
                },
                addr(9),
                ts(1020),
            ))
            .unwrap_err();
        assert!(matches!(err, LifecycleError::InvalidTransition { .. }));
    }

    #[test]
    fn test_approve_closes_and_rates() {
        let mut job = delivered_job();
        job.apply(JobEvent::at(
            JobEventKind::Approved { rating: Some(5) },
            addr(CREATOR),
            ts(1030),
        ))
        .unwrap();
        assert_eq!(job.state, JobState::Closed);
        assert_eq!(job.rating, 5);
    }

    #[test]
    fn test_approve_without_delivery_rejected() {
        let mut job = taken_job();
        let err = job
            .apply(JobEvent::at(
                JobEventKind::Approved { rating: None },
                addr(CREATOR),
                ts(1030),
            ))
            .unwrap_err();
        assert!(err.to_string().contains("no result delivered"));
    }

    #[test]
    fn test_out_of_range_rating_rejected() {
        let mut job = delivered_job();
        let err = job
            .apply(JobEvent::at(
                JobEventKind::Approved { rating: Some(6) },
                addr(CREATOR),
                ts(1030),
            ))
            .unwrap_err();
        assert_eq!(err, LifecycleError::InvalidRating(6));
    }

    #[test]
    fn test_late_review_after_unrated_approve() {
        let mut job = delivered_job();
        job.apply(JobEvent::at(
            JobEventKind::Approved { rating: None },
            addr(CREATOR),
            ts(1030),
        ))
        .unwrap();
        assert_eq!(job.rating, 0);
        job.apply(JobEvent::at(
            JobEventKind::Rated { rating: 4 },
            addr(CREATOR),
            ts(1040),
        ))
        .unwrap();
        assert_eq!(job.rating, 4);

        let err = job
            .apply(JobEvent::at(
                JobEventKind::Rated { rating: 5 },
                addr(CREATOR),
                ts(1050),
            ))
            .unwrap_err();
        assert!(err.to_string().contains("already rated"));
    }

    // ── Refund ───────────────────────────────────────────────────────

    #[test]
    fn test_worker_refund_reopens_and_clears_worker() {
        let mut job = taken_job();
        job.apply(JobEvent::at(
            JobEventKind::Refunded { by_timeout: false },
            addr(WORKER),
            ts(1020),
        ))
        .unwrap();
        assert_eq!(job.state, JobState::Open);
        assert_eq!(job.worker, None);
        assert_eq!(job.escrow_id, None);
        assert_eq!(job.taken_at, None);
    }

    #[test]
    fn test_refund_removes_worker_from_whitelist() {
        let mut job = whitelisted_open_job();
        job.apply(JobEvent::at(
            JobEventKind::WhitelistedWorkerAdded {
                worker: addr(WORKER),
            },
            addr(CREATOR),
            ts(1001),
        ))
        .unwrap();
        job.apply(JobEvent::at(
            JobEventKind::Taken {
                escrow_id: EscrowId(1),
            },
            addr(WORKER),
            ts(1010),
        ))
        .unwrap();
        job.apply(JobEvent::at(
            JobEventKind::Refunded { by_timeout: false },
            addr(WORKER),
            ts(1020),
        ))
        .unwrap();
        assert!(!job.whitelist.contains(&addr(WORKER)));
        // The worker cannot re-take without being whitelisted again.
        let err = job
            .apply(JobEvent::at(
                JobEventKind::Taken {
                    escrow_id: EscrowId(2),
                },
                addr(WORKER),
                ts(1030),
            ))
            .unwrap_err();
        assert!(err.to_string().contains("not whitelisted"));
    }

    #[test]
    fn test_creator_refund_before_timeout_rejected() {
        let mut job = taken_job(); // taken at t=1010, max_time=3600
        let err = job
            .apply(JobEvent::at(
                JobEventKind::Refunded { by_timeout: true },
                addr(CREATOR),
                ts(2000),
            ))
            .unwrap_err();
        assert!(err.to_string().contains("delivery window"));
    }

    #[test]
    fn test_creator_refund_after_timeout_allowed() {
        let mut job = taken_job();
        job.apply(JobEvent::at(
            JobEventKind::Refunded { by_timeout: true },
            addr(CREATOR),
            ts(1010 + 3600),
        ))
        .unwrap();
        assert_eq!(job.state, JobState::Open);
        assert_eq!(job.worker, None);
    }

    #[test]
    fn test_bystander_cannot_refund() {
        let mut job = taken_job();
        let err = job
            .apply(JobEvent::at(
                JobEventKind::Refunded { by_timeout: false },
                addr(9),
                ts(9000),
            ))
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidTransition {
                role: CallerRole::Other,
                ..
            }
        ));
    }

    // ── Dispute / Arbitration ────────────────────────────────────────

    fn disputed_job() -> Job {
        let mut job = delivered_job();
        job.apply(JobEvent::at(
            JobEventKind::Disputed { content_hash: None },
            addr(CREATOR),
            ts(1030),
        ))
        .unwrap();
        job
    }

    #[test]
    fn test_dispute_sets_flag_without_state_change() {
        let job = disputed_job();
        assert!(job.disputed);
        assert_eq!(job.state, JobState::Taken);
    }

    #[test]
    fn test_dispute_requires_taken() {
        let mut job = open_job();
        let err = job
            .apply(JobEvent::at(
                JobEventKind::Disputed { content_hash: None },
                addr(CREATOR),
                ts(1001),
            ))
            .unwrap_err();
        assert!(err.to_string().contains("not taken"));
    }

    #[test]
    fn test_double_dispute_rejected() {
        let mut job = disputed_job();
        let err = job
            .apply(JobEvent::at(
                JobEventKind::Disputed { content_hash: None },
                addr(WORKER),
                ts(1031),
            ))
            .unwrap_err();
        assert!(err.to_string().contains("already disputed"));
    }

    #[test]
    fn test_dispute_without_arbitrator_rejected() {
        let mut job = whitelisted_open_job(); // arbitrator: None
        job.apply(JobEvent::at(
            JobEventKind::WhitelistedWorkerAdded {
                worker: addr(WORKER),
            },
            addr(CREATOR),
            ts(1001),
        ))
        .unwrap();
        job.apply(JobEvent::at(
            JobEventKind::Taken {
                escrow_id: EscrowId(1),
            },
            addr(WORKER),
            ts(1010),
        ))
        .unwrap();
        let err = job
            .apply(JobEvent::at(
                JobEventKind::Disputed { content_hash: None },
                addr(WORKER),
                ts(1020),
            ))
            .unwrap_err();
        assert!(err.to_string().contains("no arbitrator"));
    }

    #[test]
    fn test_arbitrate_requires_dispute() {
        let mut job = taken_job();
        let err = job
            .apply(JobEvent::at(
                JobEventKind::Arbitrated {
                    creator_share: 50,
                    worker_share: 50,
                    reason_hash: None,
                },
                addr(ARBITRATOR),
                ts(1030),
            ))
            .unwrap_err();
        assert!(err.to_string().contains("not disputed"));
    }

    #[test]
    fn test_arbitrate_closes_and_clears_dispute() {
        let mut job = disputed_job();
        job.apply(JobEvent::at(
            JobEventKind::Arbitrated {
                creator_share: 50,
                worker_share: 50,
                reason_hash: None,
            },
            addr(ARBITRATOR),
            ts(1040),
        ))
        .unwrap();
        assert!(!job.disputed);
        assert_eq!(job.state, JobState::Closed);
        assert_eq!(job.collateral_owed, job.amount / 2);
    }

    #[test]
    fn test_arbitrate_shares_must_sum_to_100() {
        let mut job = disputed_job();
        let err = job
            .apply(JobEvent::at(
                JobEventKind::Arbitrated {
                    creator_share: 60,
                    worker_share: 50,
                    reason_hash: None,
                },
                addr(ARBITRATOR),
                ts(1040),
            ))
            .unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidShares {
                creator_share: 60,
                worker_share: 50
            }
        );
    }

    #[test]
    fn test_only_arbitrator_arbitrates() {
        let mut job = disputed_job();
        let err = job
            .apply(JobEvent::at(
                JobEventKind::Arbitrated {
                    creator_share: 50,
                    worker_share: 50,
                    reason_hash: None,
                },
                addr(CREATOR),
                ts(1040),
            ))
            .unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::InvalidTransition {
                role: CallerRole::Creator,
                ..
            }
        ));
    }

    #[test]
    fn test_refusal_clears_dispute_keeps_state() {
        let mut job = disputed_job();
        job.apply(JobEvent::at(
            JobEventKind::ArbitrationRefused,
            addr(ARBITRATOR),
            ts(1040),
        ))
        .unwrap();
        assert!(!job.disputed);
        assert_eq!(job.state, JobState::Taken);
        assert_eq!(job.arbitrator, Some(addr(ARBITRATOR)));
    }

    #[test]
    fn test_dispute_again_after_refusal() {
        let mut job = disputed_job();
        job.apply(JobEvent::at(
            JobEventKind::ArbitrationRefused,
            addr(ARBITRATOR),
            ts(1040),
        ))
        .unwrap();
        // The arbitrator stays appointed, so the dispute path stays open.
        job.apply(JobEvent::at(
            JobEventKind::Disputed { content_hash: None },
            addr(WORKER),
            ts(1050),
        ))
        .unwrap();
        assert!(job.disputed);
        job.apply(JobEvent::at(
            JobEventKind::Arbitrated {
                creator_share: 100,
                worker_share: 0,
                reason_hash: None,
            },
            addr(ARBITRATOR),
            ts(1060),
        ))
        .unwrap();
        assert_eq!(job.state, JobState::Closed);
        assert_eq!(job.collateral_owed, job.amount);
    }

    #[test]
    fn test_arbitrate_huge_amount_does_not_overflow() {
        let kind = JobEventKind::Created {
            title: "Everything".into(),
            content_hash: sha256_bytes(b"huge"),
            category: Category::DigitalOther,
            tags: vec![],
            token: addr(0xee),
            amount: u128::MAX / 2,
            max_time: 3600,
            arbitrator: Some(addr(ARBITRATOR)),
            multiple_applicants: true,
            whitelist_workers: false,
        };
        let mut job =
            Job::from_events(JobId(9), &[JobEvent::at(kind, addr(CREATOR), ts(1000))]).unwrap();
        job.apply(JobEvent::at(
            JobEventKind::Taken {
                escrow_id: EscrowId(1),
            },
            addr(WORKER),
            ts(1010),
        ))
        .unwrap();
        job.apply(JobEvent::at(
            JobEventKind::Disputed { content_hash: None },
            addr(WORKER),
            ts(1020),
        ))
        .unwrap();
        job.apply(JobEvent::at(
            JobEventKind::Arbitrated {
                creator_share: 50,
                worker_share: 50,
                reason_hash: None,
            },
            addr(ARBITRATOR),
            ts(1030),
        ))
        .unwrap();
        assert_eq!(job.collateral_owed, (u128::MAX / 2) / 2);
    }

    #[test]
    fn test_percentage_of_is_exact() {
        assert_eq!(percentage_of(150, 50), 75);
        assert_eq!(percentage_of(199, 33), 65);
        assert_eq!(percentage_of(u128::MAX, 100), u128::MAX);
        assert_eq!(percentage_of(u128::MAX, 0), 0);
        // Agrees with the naive formula wherever that formula is in range.
        for amount in [0u128, 1, 99, 100, 101, 12_345_678] {
            for share in [0u8, 1, 33, 50, 99, 100] {
                assert_eq!(
                    percentage_of(amount, share),
                    amount * u128::from(share) / 100
                );
            }
        }
    }

    // ── Close / Reopen / Collateral ──────────────────────────────────

    #[test]
    fn test_close_open_job() {
        let mut job = open_job();
        job.apply(JobEvent::at(JobEventKind::Closed, addr(CREATOR), ts(1001)))
            .unwrap();
        assert_eq!(job.state, JobState::Closed);
        assert_eq!(job.collateral_owed, job.amount);
    }

    #[test]
    fn test_reopen_closed_job() {
        let mut job = open_job();
        job.apply(JobEvent::at(JobEventKind::Closed, addr(CREATOR), ts(1001)))
            .unwrap();
        job.apply(JobEvent::at(JobEventKind::Reopened, addr(CREATOR), ts(1002)))
            .unwrap();
        assert_eq!(job.state, JobState::Open);
        assert_eq!(job.collateral_owed, 0);
    }

    #[test]
    fn test_cannot_reopen_completed_job() {
        let mut job = delivered_job();
        job.apply(JobEvent::at(
            JobEventKind::Approved { rating: Some(5) },
            addr(CREATOR),
            ts(1030),
        ))
        .unwrap();
        let err = job
            .apply(JobEvent::at(JobEventKind::Reopened, addr(CREATOR), ts(1040)))
            .unwrap_err();
        assert!(err.to_string().contains("completed by a worker"));
    }

    #[test]
    fn test_collateral_withdrawal() {
        let mut job = open_job();
        job.apply(JobEvent::at(JobEventKind::Closed, addr(CREATOR), ts(1001)))
            .unwrap();
        job.apply(JobEvent::at(
            JobEventKind::CollateralWithdrawn,
            addr(CREATOR),
            ts(1002),
        ))
        .unwrap();
        assert_eq!(job.collateral_owed, 0);

        let err = job
            .apply(JobEvent::at(
                JobEventKind::CollateralWithdrawn,
                addr(CREATOR),
                ts(1003),
            ))
            .unwrap_err();
        assert!(err.to_string().contains("no collateral owed"));
    }

    // ── Messages ─────────────────────────────────────────────────────

    #[test]
    fn test_anyone_messages_open_job() {
        let mut job = open_job();
        job.apply(JobEvent::at(
            JobEventKind::WorkerMessage {
                content_hash: sha256_bytes(b"can I take this?"),
                recipient: addr(CREATOR),
            },
            addr(9),
            ts(1001),
        ))
        .unwrap();
        assert_eq!(job.state, JobState::Open);
    }

    #[test]
    fn test_open_job_messages_must_target_creator() {
        let mut job = open_job();
        let err = job
            .apply(JobEvent::at(
                JobEventKind::WorkerMessage {
                    content_hash: sha256_bytes(b"psst"),
                    recipient: addr(9),
                },
                addr(WORKER),
                ts(1001),
            ))
            .unwrap_err();
        assert!(err.to_string().contains("target the creator"));
        assert_eq!(job.events_length(), 1);
    }

    #[test]
    fn test_only_participants_message_taken_job() {
        let mut job = taken_job();
        let err = job
            .apply(JobEvent::at(
                JobEventKind::WorkerMessage {
                    content_hash: sha256_bytes(b"hello"),
                    recipient: addr(CREATOR),
                },
                addr(9),
                ts(1011),
            ))
            .unwrap_err();
        assert!(err.to_string().contains("participants"));
    }

    #[test]
    fn test_no_messages_on_closed_job() {
        let mut job = open_job();
        job.apply(JobEvent::at(JobEventKind::Closed, addr(CREATOR), ts(1001)))
            .unwrap();
        let err = job
            .apply(JobEvent::at(
                JobEventKind::OwnerMessage {
                    content_hash: sha256_bytes(b"too late"),
                    recipient: addr(WORKER),
                },
                addr(CREATOR),
                ts(1002),
            ))
            .unwrap_err();
        assert!(err.to_string().contains("closed"));
    }

    // ── Replay determinism ───────────────────────────────────────────

    #[test]
    fn test_replay_yields_identical_state() {
        let job = disputed_job();
        let replayed = Job::from_events(job.id, job.events()).unwrap();
        assert_eq!(replayed.state, job.state);
        assert_eq!(replayed.worker, job.worker);
        assert_eq!(replayed.disputed, job.disputed);
        assert_eq!(replayed.whitelist, job.whitelist);
        assert_eq!(replayed.events_length(), job.events_length());
        assert_eq!(
            serde_json::to_value(&replayed).unwrap(),
            serde_json::to_value(&job).unwrap()
        );
    }
}
