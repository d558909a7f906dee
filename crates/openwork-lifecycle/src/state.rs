//! # Job States and Caller Roles
//!
//! The three job states and the role a caller holds relative to a job.
//! Both appear in `InvalidTransition` errors, so both implement `Display`.

use serde::{Deserialize, Serialize};

/// The lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    /// Published and available to take.
    Open,
    /// Claimed by a worker; escrow funded.
    Taken,
    /// Completed, arbitrated, or closed by the creator.
    Closed,
}

impl JobState {
    /// Whether new work can start on a job in this state.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Whether a worker currently holds the job.
    pub fn is_taken(&self) -> bool {
        matches!(self, Self::Taken)
    }

    /// Whether the job has been closed. Not necessarily terminal — a job
    /// closed without a worker can be reopened by its creator.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Open => "OPEN",
            Self::Taken => "TAKEN",
            Self::Closed => "CLOSED",
        };
        f.write_str(s)
    }
}

/// The role an address holds relative to a specific job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallerRole {
    /// The address that published the job.
    Creator,
    /// The address currently holding the job.
    Worker,
    /// The arbitrator fixed at creation.
    Arbitrator,
    /// Any other address.
    Other,
}

impl std::fmt::Display for CallerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Creator => "creator",
            Self::Worker => "worker",
            Self::Arbitrator => "arbitrator",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}
