//! # Inspect Subcommand
//!
//! Fold a job event log from a JSON file and print the materialized view.
//! A log the transition table rejects fails here the same way it would on
//! the ledger, which makes this the quickest way to debug a bad sequence.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use openwork_core::JobId;
use openwork_lifecycle::{Job, JobEvent};

/// Arguments for the inspect subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to a JSON array of job events.
    pub file: PathBuf,

    /// The job id to fold under.
    #[arg(long, default_value_t = 1)]
    pub job_id: u64,
}

pub fn run(args: InspectArgs) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let events: Vec<JobEvent> =
        serde_json::from_str(&json).context("parsing event log JSON")?;

    let job = Job::from_events(JobId(args.job_id), &events)
        .context("event log failed transition validation")?;

    println!("{}", serde_json::to_string_pretty(&job)?);
    Ok(())
}
