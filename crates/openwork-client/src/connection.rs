//! # Connection State
//!
//! Whether the client currently holds a signer. Reconnecting replaces the
//! whole value rather than mutating fields in place, so a half-updated
//! connection can never be observed.

use openwork_core::Address;
use openwork_crypto::Signer;

/// Client tuning knobs.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// How long `wait` may block on finality before the gateway's own
    /// timeout applies, in seconds.
    pub wait_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            wait_timeout_secs: 60,
        }
    }
}

/// The client's signer slot.
#[derive(Debug, Default)]
pub enum Connection<S> {
    /// No signer attached. Reads work; writes fail with `NotConnected`.
    #[default]
    Disconnected,
    /// A signer is attached and writes are possible.
    Connected {
        /// The active signer.
        signer: S,
    },
}

impl<S: Signer> Connection<S> {
    /// The attached signer, if connected.
    pub fn signer(&self) -> Option<&S> {
        match self {
            Self::Disconnected => None,
            Self::Connected { signer } => Some(signer),
        }
    }

    /// The connected address, if any.
    pub fn address(&self) -> Option<Address> {
        self.signer().map(|s| s.address())
    }

    /// Whether a signer is attached.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openwork_crypto::LocalKeySigner;

    #[test]
    fn test_disconnected_has_no_signer() {
        let conn: Connection<LocalKeySigner> = Connection::Disconnected;
        assert!(!conn.is_connected());
        assert!(conn.signer().is_none());
        assert!(conn.address().is_none());
    }

    #[test]
    fn test_connected_exposes_address() {
        let signer = LocalKeySigner::from_seed(&[5u8; 32]);
        let expected = signer.address();
        let conn = Connection::Connected { signer };
        assert!(conn.is_connected());
        assert_eq!(conn.address(), Some(expected));
    }
}
