//! Chain handlers: `/read` and `/broadcast`.

use crate::{ApiResult, AppState, BlockchainJson};
use axum::{extract::State, Json};
use postnet_consensus::{Block, BlockJson};
use postnet_state::BroadcastOutcome;
use tracing::{debug, info};

/// GET /read
///
/// Return the full accepted chain, genesis first. Always succeeds.
pub async fn read_chain(State(state): State<AppState>) -> Json<BlockchainJson> {
    let blockchain = state
        .chain
        .chain()
        .iter()
        .map(BlockJson::encode)
        .collect();
    Json(BlockchainJson { blockchain })
}

/// POST /broadcast
///
/// Offer a candidate chain. A strictly longer valid chain replaces the
/// local one; anything else is ignored. The response is 200 either way so
/// a byzantine peer learns nothing and destabilizes nothing.
pub async fn receive_broadcast(
    State(state): State<AppState>,
    Json(request): Json<BlockchainJson>,
) -> ApiResult<()> {
    let candidate = request
        .blockchain
        .iter()
        .map(BlockJson::decode)
        .collect::<Result<Vec<Block>, _>>()?;
    match state.chain.apply_broadcast(candidate) {
        BroadcastOutcome::Accepted { length } => {
            info!(port = state.port, length, "accepted a broadcast");
        }
        BroadcastOutcome::NotLonger => {
            debug!(port = state.port, "ignored a broadcast that was not longer");
        }
        BroadcastOutcome::Invalid(err) => {
            debug!(port = state.port, error = %err, "ignored an invalid broadcast");
        }
    }
    Ok(())
}
