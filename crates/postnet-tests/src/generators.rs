//! Shared fixtures for tests.

use postnet_consensus::{
    hash, try_solve, unix_nanos, Block, BlockHeader, Digest32, Post, PrivateKey,
};

/// Grind out a valid block on top of `prev_hash` carrying `posts`.
pub fn mine_block(prev_hash: Digest32, posts: Vec<Post>) -> Block {
    let mut header = BlockHeader {
        prev_hash,
        summary: hash(&posts),
        timestamp: unix_nanos(),
        nonce: 0,
    };
    while !try_solve(&mut header, 10_000) {}
    Block { header, posts }
}

/// Grind out a valid chain where each block carries one signed post.
pub fn mine_chain(key: &PrivateKey, contents: &[&str]) -> Vec<Block> {
    let mut chain: Vec<Block> = Vec::with_capacity(contents.len());
    for content in contents {
        let prev_hash = chain
            .last()
            .map(|block| block.header.digest())
            .unwrap_or_else(Digest32::zero);
        chain.push(mine_block(prev_hash, vec![Post::signed(key, *content)]));
    }
    chain
}
