//! # postnet-client
//!
//! The user side of postnet. A user owns an RSA key pair, discovers miners
//! through the tracker, writes signed posts to a random miner subset and
//! reads back the longest valid chain.

mod error;
mod user;

pub use error::{ClientError, ClientResult};
pub use user::User;

/// Number of miners selected for each read or write.
pub const RW_COUNT: usize = 3;
