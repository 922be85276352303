//! Wire request/response bodies shared by handlers, gossip and tests.

use postnet_consensus::{BlockJson, PostJson};
use serde::{Deserialize, Serialize};

/// Body of `/sync`: a batch of encoded posts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostsJson {
    pub posts: Vec<PostJson>,
}

/// Body of `/read` responses and `/broadcast` requests: an encoded chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockchainJson {
    pub blockchain: Vec<BlockJson>,
}
