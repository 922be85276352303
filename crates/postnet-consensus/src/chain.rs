//! Whole-chain validation.

use crate::block::{Block, PostKey};
use crate::error::{ConsensusError, ConsensusResult};
use std::collections::BTreeSet;

/// Validate a candidate chain: every block valid, the first block linked to
/// the zero digest, hash links intact, and no post in more than one block.
///
/// Returns the set of post keys accepted by the chain, which callers reuse
/// as the accepted-post index after a switch.
pub fn validate_chain(blocks: &[Block]) -> ConsensusResult<BTreeSet<PostKey>> {
    for (height, block) in blocks.iter().enumerate() {
        if !block.verify() {
            return Err(ConsensusError::InvalidBlock { height });
        }
    }
    if let Some(first) = blocks.first() {
        if !first.header.prev_hash.is_zero() {
            return Err(ConsensusError::NonZeroGenesis);
        }
    }
    for (i, pair) in blocks.windows(2).enumerate() {
        if pair[1].header.prev_hash != pair[0].header.digest() {
            return Err(ConsensusError::BrokenLink { height: i + 1 });
        }
    }
    let mut accepted = BTreeSet::new();
    for block in blocks {
        for post in &block.posts {
            if !accepted.insert(post.key()) {
                return Err(ConsensusError::DuplicatePost);
            }
        }
    }
    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockHeader, Post};
    use crate::crypto::{generate_key, hash, Digest32};
    use crate::pow::try_solve;
    use crate::unix_nanos;

    fn mine_block(prev_hash: Digest32, posts: Vec<Post>) -> Block {
        let mut header = BlockHeader {
            prev_hash,
            summary: hash(&posts),
            timestamp: unix_nanos(),
            nonce: 0,
        };
        while !try_solve(&mut header, 10_000) {}
        Block { header, posts }
    }

    #[test]
    fn empty_chain_is_valid() {
        assert_eq!(validate_chain(&[]), Ok(BTreeSet::new()));
    }

    #[test]
    fn linked_chain_is_valid() {
        let key = generate_key();
        let first = mine_block(Digest32::zero(), vec![Post::signed(&key, "a")]);
        let second = mine_block(first.header.digest(), vec![Post::signed(&key, "b")]);

        let accepted = validate_chain(&[first.clone(), second.clone()]).unwrap();
        assert_eq!(accepted.len(), 2);
        assert!(accepted.contains(&first.posts[0].key()));
        assert!(accepted.contains(&second.posts[0].key()));
    }

    #[test]
    fn rejects_non_zero_genesis_link() {
        let key = generate_key();
        let mut prev = Digest32::zero();
        prev.0[0] = 1;
        let block = mine_block(prev, vec![Post::signed(&key, "a")]);
        assert_eq!(validate_chain(&[block]), Err(ConsensusError::NonZeroGenesis));
    }

    #[test]
    fn rejects_broken_link() {
        let key = generate_key();
        let first = mine_block(Digest32::zero(), vec![Post::signed(&key, "a")]);
        let second = mine_block(Digest32::zero(), vec![Post::signed(&key, "b")]);
        assert_eq!(
            validate_chain(&[first, second]),
            Err(ConsensusError::BrokenLink { height: 1 })
        );
    }

    #[test]
    fn rejects_unmined_block() {
        let key = generate_key();
        let posts = vec![Post::signed(&key, "a")];
        let block = Block {
            header: BlockHeader {
                prev_hash: Digest32::zero(),
                summary: hash(&posts),
                timestamp: unix_nanos(),
                nonce: 0,
            },
            posts,
        };
        // overwhelmingly likely not to meet the target with a fixed nonce
        if !block.verify() {
            assert_eq!(
                validate_chain(&[block]),
                Err(ConsensusError::InvalidBlock { height: 0 })
            );
        }
    }

    #[test]
    fn rejects_duplicate_post_across_blocks() {
        let key = generate_key();
        let post = Post::signed(&key, "a");
        let first = mine_block(Digest32::zero(), vec![post.clone()]);
        let second = mine_block(first.header.digest(), vec![post]);
        assert_eq!(
            validate_chain(&[first, second]),
            Err(ConsensusError::DuplicatePost)
        );
    }
}
