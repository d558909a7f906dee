//! Client error aggregation. Every lower-layer failure keeps its own type
//! and converts via `#[from]`, so callers can match on the layer that
//! failed.

use openwork_content::ContentError;
use openwork_core::JobId;
use openwork_crypto::{SignerError, TakeAuthorizationError};
use openwork_lifecycle::{LifecycleError, ProfileError};
use thiserror::Error;

use crate::gateway::GatewayError;

/// Errors surfaced by the marketplace client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The client has no connected signer. Connect before writing.
    #[error("client is not connected")]
    NotConnected,

    /// No job exists with the given id.
    #[error("job not found: {0}")]
    JobNotFound(JobId),

    /// Local transition validation rejected the operation before any
    /// ledger call was made.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Profile validation failed.
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Take-authorization signing or verification failed.
    #[error(transparent)]
    Authorization(#[from] TakeAuthorizationError),

    /// The signer backend failed.
    #[error(transparent)]
    Signer(#[from] SignerError),

    /// The ledger gateway failed. Never retried by the client.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The content store failed.
    #[error(transparent)]
    Content(#[from] ContentError),
}
