//! # openwork CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// Openwork marketplace developer toolchain.
///
/// Generates keys, signs take authorizations, hashes content for the
/// content store, and inspects job event logs.
#[derive(Parser, Debug)]
#[command(name = "openwork", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Generate an Ed25519 key pair or derive one from a seed.
    Keygen(openwork_cli::keygen::KeygenArgs),
    /// Sign a take authorization for a job at a given event count.
    SignTake(openwork_cli::sign::SignTakeArgs),
    /// SHA-256 a file and print its ledger digest and content CID.
    Hash(openwork_cli::hash::HashArgs),
    /// Fold a job event log and print the materialized job.
    Inspect(openwork_cli::inspect::InspectArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Keygen(args) => openwork_cli::keygen::run(args),
        Commands::SignTake(args) => openwork_cli::sign::run(args),
        Commands::Hash(args) => openwork_cli::hash::run(args),
        Commands::Inspect(args) => openwork_cli::inspect::run(args),
    }
}
