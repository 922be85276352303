//! Client error types.

use thiserror::Error;

/// Errors surfaced to users of the client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// An outbound request failed at the transport level.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The tracker had no miners to offer.
    #[error("failed to retrieve miners from the tracker")]
    NoMiners,

    /// A miner rejected a written post.
    #[error("miner {port} rejected the post ({status})")]
    Rejected {
        port: u16,
        status: reqwest::StatusCode,
    },

    /// No queried miner returned a chain that passed validation.
    #[error("failed to receive a valid blockchain")]
    NoValidChain,
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
