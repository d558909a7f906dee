//! # Sign Subcommand
//!
//! Produce a take authorization offline: the Ed25519 signature over the
//! canonical `{ events_length, job_id }` payload.

use anyhow::Context;
use clap::Args;
use openwork_core::JobId;
use openwork_crypto::{LocalKeySigner, Signer, TakeAuthorization};

/// Arguments for the sign-take subcommand.
#[derive(Args, Debug)]
pub struct SignTakeArgs {
    /// The 64-character hex seed of the signing key.
    #[arg(long)]
    pub seed: String,

    /// The job to claim.
    #[arg(long)]
    pub job_id: u64,

    /// The job's current event count. A mismatch at submission time makes
    /// the signature stale.
    #[arg(long)]
    pub events_length: u64,
}

pub fn run(args: SignTakeArgs) -> anyhow::Result<()> {
    let seed = crate::parse_seed(&args.seed)?;
    let signer = LocalKeySigner::from_seed(&seed);
    let authorization = TakeAuthorization::sign(&signer, JobId(args.job_id), args.events_length)
        .context("signing take authorization")?;

    let out = serde_json::json!({
        "signer": signer.address().to_hex(),
        "authorization": authorization,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&out).context("rendering authorization")?
    );
    Ok(())
}
