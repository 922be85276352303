//! # postnet-api
//!
//! REST API for a postnet miner.
//!
//! This crate provides the four miner endpoints:
//! - `GET /read` - the full accepted chain
//! - `POST /write` - admit one signed user post
//! - `POST /sync` - merge a batch of peer posts
//! - `POST /broadcast` - offer a candidate chain

mod error;
mod handlers;
mod messages;
mod routes;
mod state;

pub use error::{ApiError, ApiResult};
pub use messages::{BlockchainJson, PostsJson};
pub use routes::create_router;
pub use state::AppState;

use axum::Router;

/// Create the miner API router with all routes.
pub fn build_api(state: AppState) -> Router {
    create_router(state)
}
