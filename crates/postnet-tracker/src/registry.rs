//! The registry of live miners.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Maps each registered miner port to its expiration deadline.
///
/// Expired entries are dropped inside the same critical section that serves
/// each request, so an expired port is never observable and re-registration
/// resets the deadline atomically.
pub struct MinerRegistry {
    timeout: Duration,
    entries: Mutex<HashMap<u16, Instant>>,
}

impl MinerRegistry {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Register (or renew) a miner and return every live port, the caller
    /// included. Always succeeds; duplicate registration is an idempotent
    /// deadline reset.
    pub fn register(&self, port: u16) -> Vec<u16> {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        entries.retain(|_, deadline| *deadline > now);
        entries.insert(port, now + self.timeout);
        let mut ports: Vec<u16> = entries.keys().copied().collect();
        ports.sort_unstable();
        ports
    }

    /// Every currently live port.
    pub fn live_miners(&self) -> Vec<u16> {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        entries.retain(|_, deadline| *deadline > now);
        let mut ports: Vec<u16> = entries.keys().copied().collect();
        ports.sort_unstable();
        ports
    }
}
