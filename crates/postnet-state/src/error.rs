//! State error types.

use thiserror::Error;

/// Errors raised while admitting posts to the pending pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The post is already part of an accepted block.
    #[error("duplicated post on the blockchain")]
    DuplicateOnChain,

    /// The post is already waiting in the pending pool.
    #[error("duplicated post in the pool")]
    DuplicateInPool,
}

/// Result type for state operations.
pub type StateResult<T> = Result<T, StateError>;
