//! Shared application state.

use postnet_state::MinerState;
use std::sync::Arc;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct AppState {
    /// The miner's chain state.
    pub chain: Arc<MinerState>,
    /// The miner's own port, for log context.
    pub port: u16,
}

impl AppState {
    pub fn new(chain: Arc<MinerState>, port: u16) -> Self {
        Self { chain, port }
    }
}
