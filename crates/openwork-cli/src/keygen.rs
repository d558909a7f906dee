//! # Keygen Subcommand
//!
//! Generate an Ed25519 key pair, or derive the public half from a seed.

use anyhow::Context;
use clap::Args;
use openwork_crypto::Ed25519KeyPair;
use rand::RngCore;

/// Arguments for the keygen subcommand.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Derive from this 64-character hex seed instead of generating one.
    #[arg(long)]
    pub seed: Option<String>,
}

pub fn run(args: KeygenArgs) -> anyhow::Result<()> {
    let (seed, generated) = match &args.seed {
        Some(hex) => (crate::parse_seed(hex)?, false),
        None => {
            let mut seed = [0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut seed);
            (seed, true)
        }
    };
    let keypair = Ed25519KeyPair::from_seed(&seed);

    let mut out = serde_json::json!({
        "address": keypair.address().to_hex(),
        "public_key": keypair.public_key().to_hex(),
    });
    if generated {
        // Only echo the seed when we invented it; a caller-supplied seed is
        // already in their hands.
        let hex: String = seed.iter().map(|b| format!("{b:02x}")).collect();
        out["seed"] = serde_json::Value::String(hex);
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&out).context("rendering key material")?
    );
    Ok(())
}
