//! API route definitions.

use crate::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the miner API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/read", get(handlers::chain::read_chain))
        .route("/write", post(handlers::posts::write_post))
        .route("/sync", post(handlers::posts::sync_posts))
        .route("/broadcast", post(handlers::chain::receive_broadcast))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
