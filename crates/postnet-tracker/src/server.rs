//! The tracker HTTP service.

use crate::{MinerRegistry, ENTRY_TIMEOUT, SHUTDOWN_GRACE};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Body of `/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortJson {
    pub port: u16,
}

/// Body of `/register` and `/get_miners` responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortsJson {
    pub ports: Vec<u16>,
}

/// Create the tracker router over a registry.
pub fn create_router(registry: Arc<MinerRegistry>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/get_miners", get(get_miners))
        .layer(TraceLayer::new_for_http())
        .with_state(registry)
}

/// POST /register
async fn register(
    State(registry): State<Arc<MinerRegistry>>,
    Json(request): Json<PortJson>,
) -> Json<PortsJson> {
    let ports = registry.register(request.port);
    Json(PortsJson { ports })
}

/// GET /get_miners
///
/// 404 when no miner is currently live.
async fn get_miners(State(registry): State<Arc<MinerRegistry>>) -> Response {
    let ports = registry.live_miners();
    if ports.is_empty() {
        let body = serde_json::json!({ "error": "no miners registered" });
        (StatusCode::NOT_FOUND, Json(body)).into_response()
    } else {
        Json(PortsJson { ports }).into_response()
    }
}

/// A running tracker service.
pub struct Tracker {
    port: u16,
    shutdown_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Tracker {
    /// Bind and start serving. Returns once the listener is accepting.
    pub async fn start(port: u16) -> std::io::Result<Self> {
        let registry = Arc::new(MinerRegistry::new(ENTRY_TIMEOUT));
        let router = create_router(registry);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        info!(port, "tracker listening");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let server = axum::serve(listener, router).with_graceful_shutdown(async {
            shutdown_rx.await.ok();
        });
        let handle = tokio::spawn(async move {
            if let Err(err) = server.await {
                warn!(error = %err, "tracker server error");
            }
        });

        Ok(Self {
            port,
            shutdown_tx,
            handle,
        })
    }

    /// The port this tracker is serving on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Stop serving, waiting up to the grace window for in-flight requests.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(());
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut self.handle)
            .await
            .is_err()
        {
            warn!(port = self.port, "tracker shutdown timed out");
            self.handle.abort();
        }
        info!(port = self.port, "tracker stopped");
    }
}
