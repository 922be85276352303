//! # postnet-miner
//!
//! The miner node. A miner serves the four chain endpoints over HTTP and
//! runs one background routine that, in each pass:
//!
//! 1. Sends a heartbeat to the tracker when due, refreshing the peer list
//! 2. Gossips its pending pool to every peer when due
//! 3. Runs one bounded mining attempt, committing and broadcasting on
//!    success
//!
//! The intervals are randomized per miner at startup to desynchronize load
//! across a deployment.

mod miner;
mod routine;

pub use miner::Miner;

use std::time::Duration;

/// Heartbeat interval is drawn from [`HEARTBEAT_MIN_MS`, `HEARTBEAT_MAX_MS`).
pub const HEARTBEAT_MIN_MS: u64 = 200;
pub const HEARTBEAT_MAX_MS: u64 = 400;

/// Gossip interval is drawn from [`SYNC_MIN_MS`, `SYNC_MAX_MS`).
pub const SYNC_MIN_MS: u64 = 300;
pub const SYNC_MAX_MS: u64 = 600;

/// Nonces tried per mining pass before control returns to the routine.
pub const MINING_ITERATIONS: u32 = 10_000;

/// Maximum posts packed into one block.
pub const POSTS_PER_BLOCK: usize = 2;

/// Timeout for outbound gossip, broadcast and tracker calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Grace window for HTTP server and routine shutdown.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
