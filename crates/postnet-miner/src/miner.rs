//! Miner lifecycle: server + routine startup and shutdown.

use crate::routine::Routine;
use crate::{REQUEST_TIMEOUT, SHUTDOWN_GRACE};
use postnet_api::AppState;
use postnet_state::MinerState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// A running miner node.
pub struct Miner {
    port: u16,
    state: Arc<MinerState>,
    shutdown: Arc<AtomicBool>,
    server_shutdown_tx: oneshot::Sender<()>,
    server_handle: JoinHandle<()>,
    routine_handle: JoinHandle<()>,
}

impl Miner {
    /// Bind the API server and start the background routine. Returns once
    /// the listener is accepting.
    pub async fn start(port: u16, tracker_port: u16) -> std::io::Result<Self> {
        let state = Arc::new(MinerState::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let router = postnet_api::build_api(AppState::new(Arc::clone(&state), port));
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        info!(port, tracker_port, "miner listening");

        let (server_shutdown_tx, server_shutdown_rx) = oneshot::channel();
        let server = axum_serve(listener, router, server_shutdown_rx);
        let server_handle = tokio::spawn(server);

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client construction failed");
        let routine = Routine::new(
            port,
            tracker_port,
            Arc::clone(&state),
            client,
            Arc::clone(&shutdown),
        );
        let routine_handle = tokio::spawn(routine.run());

        Ok(Self {
            port,
            state,
            shutdown,
            server_shutdown_tx,
            server_handle,
            routine_handle,
        })
    }

    /// The port this miner is serving on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// This miner's chain state (shared with the running server).
    pub fn state(&self) -> &Arc<MinerState> {
        &self.state
    }

    /// Stop the routine first, then the server, each within the grace
    /// window.
    pub async fn shutdown(mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut self.routine_handle)
            .await
            .is_err()
        {
            warn!(port = self.port, "miner routine shutdown timed out");
            self.routine_handle.abort();
        }

        let _ = self.server_shutdown_tx.send(());
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut self.server_handle)
            .await
            .is_err()
        {
            warn!(port = self.port, "miner server shutdown timed out");
            self.server_handle.abort();
        }
        info!(port = self.port, "miner stopped");
    }
}

async fn axum_serve(
    listener: tokio::net::TcpListener,
    router: axum::Router,
    shutdown_rx: oneshot::Receiver<()>,
) {
    let server = axum::serve(listener, router).with_graceful_shutdown(async {
        shutdown_rx.await.ok();
    });
    if let Err(err) = server.await {
        warn!(error = %err, "miner server error");
    }
}
