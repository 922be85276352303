//! A partition-aware tracker for fork/merge scenarios.
//!
//! Behaves exactly like the real tracker, except that while the partition
//! flag is set, `/register` answers each miner with only the live miners
//! whose port shares the caller's parity. Gossip and broadcast then stay
//! within each half, so the two halves grow divergent chains.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use parking_lot::Mutex;
use postnet_tracker::{PortJson, PortsJson, ENTRY_TIMEOUT, SHUTDOWN_GRACE};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

struct PartitionState {
    entries: Mutex<HashMap<u16, Instant>>,
    partitioned: AtomicBool,
}

/// A running partition-aware tracker.
pub struct PartitionTracker {
    state: Arc<PartitionState>,
    port: u16,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl PartitionTracker {
    /// Bind and start serving. Returns once the listener is accepting.
    pub async fn start(port: u16) -> std::io::Result<Self> {
        let state = Arc::new(PartitionState {
            entries: Mutex::new(HashMap::new()),
            partitioned: AtomicBool::new(false),
        });

        let router = Router::new()
            .route("/register", post(register))
            .route("/get_miners", get(get_miners))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        info!(port, "partition tracker listening");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let server = axum::serve(listener, router).with_graceful_shutdown(async {
            shutdown_rx.await.ok();
        });
        let handle = tokio::spawn(async move {
            if let Err(err) = server.await {
                warn!(error = %err, "partition tracker server error");
            }
        });

        Ok(Self {
            state,
            port,
            shutdown_tx,
            handle,
        })
    }

    /// Toggle the partition.
    pub fn partition(&self, partitioned: bool) {
        self.state.partitioned.store(partitioned, Ordering::SeqCst);
        info!(partitioned, "partition flag changed");
    }

    /// Stop serving.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(());
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut self.handle)
            .await
            .is_err()
        {
            self.handle.abort();
        }
        info!(port = self.port, "partition tracker stopped");
    }
}

async fn register(
    State(state): State<Arc<PartitionState>>,
    Json(request): Json<PortJson>,
) -> Json<PortsJson> {
    let caller = request.port;
    let mut entries = state.entries.lock();
    let now = Instant::now();
    entries.retain(|_, deadline| *deadline > now);
    entries.insert(caller, now + ENTRY_TIMEOUT);

    let mut ports: Vec<u16> = if state.partitioned.load(Ordering::SeqCst) {
        entries
            .keys()
            .copied()
            .filter(|port| port % 2 == caller % 2)
            .collect()
    } else {
        entries.keys().copied().collect()
    };
    ports.sort_unstable();
    Json(PortsJson { ports })
}

async fn get_miners(State(state): State<Arc<PartitionState>>) -> Response {
    let mut entries = state.entries.lock();
    let now = Instant::now();
    entries.retain(|_, deadline| *deadline > now);
    let mut ports: Vec<u16> = entries.keys().copied().collect();
    ports.sort_unstable();
    drop(entries);

    if ports.is_empty() {
        let body = serde_json::json!({ "error": "no miners registered" });
        (StatusCode::NOT_FOUND, Json(body)).into_response()
    } else {
        Json(PortsJson { ports }).into_response()
    }
}
