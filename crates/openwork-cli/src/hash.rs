//! # Hash Subcommand
//!
//! SHA-256 a file (or stdin) and print the digest both ways it appears in
//! the system: the `sha256:` form carried on the ledger and the base58 CID
//! used to address the content store.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use openwork_content::to_cid;
use openwork_core::sha256_bytes;

/// Arguments for the hash subcommand.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// File to hash; reads stdin when omitted.
    pub file: Option<PathBuf>,
}

pub fn run(args: HashArgs) -> anyhow::Result<()> {
    let bytes = match &args.file {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))?
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            buf
        }
    };

    let digest = sha256_bytes(&bytes);
    let out = serde_json::json!({
        "digest": digest.to_string(),
        "cid": to_cid(&digest),
        "size": bytes.len(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
