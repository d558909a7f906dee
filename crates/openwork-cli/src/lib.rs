//! # openwork CLI Library
//!
//! Argument types and handlers for the `openwork` binary, one module per
//! subcommand.

pub mod hash;
pub mod inspect;
pub mod keygen;
pub mod sign;

use anyhow::{bail, Context};

/// Parse a 64-character hex string into a 32-byte key seed.
pub(crate) fn parse_seed(hex: &str) -> anyhow::Result<[u8; 32]> {
    let hex = hex.trim();
    if hex.len() != 64 {
        bail!("seed must be 64 hex characters, got {}", hex.len());
    }
    let mut seed = [0u8; 32];
    for (i, byte) in seed.iter_mut().enumerate() {
        let pos = i * 2;
        *byte = u8::from_str_radix(&hex[pos..pos + 2], 16)
            .with_context(|| format!("invalid hex at position {pos}"))?;
    }
    Ok(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_roundtrip() {
        let hex = "0101010101010101010101010101010101010101010101010101010101010101";
        assert_eq!(parse_seed(hex).unwrap(), [1u8; 32]);
    }

    #[test]
    fn test_parse_seed_rejects_bad_input() {
        assert!(parse_seed("abc").is_err());
        assert!(parse_seed(&"zz".repeat(32)).is_err());
    }
}
