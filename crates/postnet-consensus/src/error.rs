//! Consensus error types.

use thiserror::Error;

/// Errors raised while decoding or validating chain data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    /// A base64 field could not be decoded.
    #[error("field `{0}` is not valid base64")]
    Base64(&'static str),

    /// A digest field decoded to the wrong number of bytes.
    #[error("field `{0}` must decode to exactly 32 bytes")]
    DigestLength(&'static str),

    /// A serialized public key was too short or not a usable RSA key.
    #[error("malformed public key bytes")]
    MalformedKey,

    /// A block failed verification (signature, summary or target).
    #[error("block at height {height} failed verification")]
    InvalidBlock { height: usize },

    /// The first block of a chain does not link to the zero digest.
    #[error("genesis block does not link to the zero digest")]
    NonZeroGenesis,

    /// A block's previous-hash does not match its predecessor.
    #[error("broken hash link at height {height}")]
    BrokenLink { height: usize },

    /// The same post appears in more than one block.
    #[error("duplicate post across blocks")]
    DuplicatePost,
}

/// Result type for consensus operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;
