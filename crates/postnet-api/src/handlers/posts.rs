//! Post admission handlers: `/write` and `/sync`.

use crate::{ApiError, ApiResult, AppState, PostsJson};
use axum::{extract::State, Json};
use postnet_consensus::{Post, PostJson};
use tracing::{debug, info};

/// POST /write
///
/// Admit one user post to the pool. Rejects posts whose signature does not
/// verify, and posts already on the chain or already pending.
pub async fn write_post(
    State(state): State<AppState>,
    Json(encoded): Json<PostJson>,
) -> ApiResult<()> {
    let post = encoded.decode()?;
    if !post.verify() {
        debug!(port = state.port, "rejected post with a bad signature");
        return Err(ApiError::InvalidPost);
    }
    let content = post.body.content.clone();
    state.chain.admit_post(post)?;
    info!(port = state.port, content = %content, "received post from user");
    Ok(())
}

/// POST /sync
///
/// Merge a batch of peer posts into the pool. The whole batch is rejected
/// if any post fails signature verification; posts already known are
/// silently skipped.
pub async fn sync_posts(
    State(state): State<AppState>,
    Json(request): Json<PostsJson>,
) -> ApiResult<()> {
    let posts = request
        .posts
        .iter()
        .map(PostJson::decode)
        .collect::<Result<Vec<Post>, _>>()?;
    if posts.iter().any(|post| !post.verify()) {
        debug!(port = state.port, "rejected sync batch with a bad signature");
        return Err(ApiError::InvalidBatch);
    }
    let added = state.chain.merge_posts(posts);
    if added > 0 {
        info!(port = state.port, added, "synced posts to pool");
    }
    Ok(())
}
