//! # postnet-state
//!
//! The mutable state of a miner: the accepted chain, the accepted-post
//! index, and the pending pool, all guarded by a single reader-writer lock.
//!
//! This crate provides:
//! - Post admission with write/sync duplicate semantics
//! - Longest-chain broadcast acceptance with pool reconstruction
//! - Mining snapshots and the optimistic commit keyed on chain length

mod error;
mod manager;

pub use error::{StateError, StateResult};
pub use manager::{BroadcastOutcome, MinerState, MiningJob, StateStats};
