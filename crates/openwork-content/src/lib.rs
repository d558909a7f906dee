//! # openwork-content — Content-Addressed Storage
//!
//! The marketplace ledger carries only digests; the payloads they name live
//! in an external content store. This crate defines the [`ContentStore`]
//! capability trait, the base58 CID codec used to reference payloads in
//! URLs and UIs, and an in-memory store for tests.

pub mod cid;
pub mod store;

pub use cid::{from_cid, to_cid, CidError};
pub use store::{ContentError, ContentStore, MemoryContentStore};
