//! # openwork-lifecycle — The Job State Machine
//!
//! A pure, event-sourced model of the marketplace job lifecycle. The ordered
//! event log is the source of truth; a [`Job`] is the materialized view of a
//! fold over that log, never independently mutable storage.
//!
//! ## States
//!
//! ```text
//! Open ──Take──▶ Taken ──Approve──▶ Closed
//!  │ ▲             │ ▲                 │
//!  │ └──Refund─────┘ │                 │
//!  │                 Dispute/Arbitrate │
//!  └──Close──▶ Closed ──Reopen─────────┘
//! ```
//!
//! A disputed job is a sub-state of `Taken` until arbitrated, after which it
//! becomes `Closed`.
//!
//! ## Design Decision
//!
//! Transitions are validated at runtime by an enum-based `validate()` rather
//! than encoded as typestates. The table has nine transition rows with
//! role- and time-dependent preconditions (a creator may refund only after
//! the delivery window elapses); those guards cannot be expressed in the
//! type system anyway, and the caller-facing contract requires a structured
//! `InvalidTransition` error naming the offending (state, event, role)
//! triple rather than a compile error.
//!
//! ## Determinism
//!
//! `Job::from_events` is a deterministic fold: replaying the same sequence
//! always yields the same state. Validation uses the timestamp carried by
//! the event being applied, never the wall clock, so replay is reproducible.

pub mod category;
pub mod error;
pub mod event;
pub mod job;
pub mod profiles;
pub mod state;

// Re-export primary types for ergonomic imports.
pub use category::{Category, Tag};
pub use error::LifecycleError;
pub use event::{JobEvent, JobEventKind};
pub use job::Job;
pub use profiles::{ArbitratorProfile, ProfileError, UserProfile};
pub use state::{CallerRole, JobState};
