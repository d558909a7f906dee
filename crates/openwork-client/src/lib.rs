//! # openwork-client — The Marketplace Client
//!
//! The high-level entry point of the SDK: a [`MarketplaceClient`] generic
//! over three capabilities — a [`Signer`](openwork_crypto::Signer) for
//! signatures, a [`LedgerGateway`] for ledger reads and writes, and a
//! [`ContentStore`](openwork_content::ContentStore) for off-ledger
//! payloads. Host applications provide the capability implementations; the
//! client provides the orchestration and local validation.
//!
//! Writes return a [`PendingTx`] handle as soon as the ledger accepts the
//! submission. Finality is observed separately via
//! [`MarketplaceClient::wait`]; nothing retries automatically.

pub mod client;
pub mod connection;
pub mod error;
pub mod gateway;
pub mod memory;

pub use client::{JobSpec, JobUpdate, MarketplaceClient};
pub use connection::{ClientConfig, Connection};
pub use error::ClientError;
pub use gateway::{GatewayError, LedgerGateway, PendingTx, TxKind, TxReceipt, TxRequest};
pub use memory::InMemoryLedger;
