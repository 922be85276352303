//! Block integrity tests: a mined block must verify, survive the wire, and
//! reject any tampering.

use crate::generators::mine_block;
use postnet_consensus::{generate_key, BlockJson, Digest32, Post};

#[test]
fn mined_block_verifies_round_trips_and_detects_tampering() {
    let posts: Vec<Post> = (0..3)
        .map(|i| Post::signed(&generate_key(), format!("Hello from {i}")))
        .collect();

    let mut block = mine_block(Digest32::zero(), posts.clone());
    assert!(block.verify(), "freshly mined block must be valid");

    // encoding and then decoding must return the identical block
    let decoded = BlockJson::encode(&block).decode().unwrap();
    assert_eq!(block, decoded);

    // deleting a post breaks the summary commitment
    block.posts.truncate(2);
    assert!(!block.verify(), "post deletion must invalidate the block");

    // tampering with the previous hash breaks the proof-of-work
    block.posts = posts;
    block.header.prev_hash.0[0] = 1;
    assert!(!block.verify(), "prev-hash tampering must invalidate the block");
}
