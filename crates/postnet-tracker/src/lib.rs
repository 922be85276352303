//! # postnet-tracker
//!
//! The membership oracle of a postnet deployment. Miners register their
//! port and renew it with heartbeats; an entry that is not renewed within
//! [`ENTRY_TIMEOUT`] expires. The tracker is trusted and holds no chain
//! state.

mod registry;
mod server;

pub use registry::MinerRegistry;
pub use server::{create_router, PortJson, PortsJson, Tracker};

use std::time::Duration;

/// A miner entry expires this long after its last registration.
pub const ENTRY_TIMEOUT: Duration = Duration::from_millis(500);

/// Grace window for HTTP server shutdown.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
