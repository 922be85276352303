//! The miner's shared state and the operations that mutate it.
//!
//! All writable fields live in one record behind one `RwLock`. Read-only
//! callers (chain reads, mining snapshots) take the shared lock; admission,
//! broadcast acceptance and mined-block commits take the exclusive lock.
//! Nothing here performs network I/O, so the lock is never held across a
//! suspension point.

use crate::error::{StateError, StateResult};
use parking_lot::RwLock;
use postnet_consensus::{validate_chain, Block, ConsensusError, Digest32, Post, PostKey};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Counters describing a miner's current state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateStats {
    pub chain_len: usize,
    pub accepted_posts: usize,
    pub pending_posts: usize,
}

/// Snapshot handed to a mining pass: the tip to extend and the posts to
/// pack. `height` is re-checked at commit time.
#[derive(Debug, Clone)]
pub struct MiningJob {
    pub height: usize,
    pub prev_hash: Digest32,
    pub posts: Vec<Post>,
}

/// Result of offering a candidate chain via broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastOutcome {
    /// The candidate replaced the local chain.
    Accepted { length: usize },
    /// The candidate was not strictly longer than the local chain.
    NotLonger,
    /// The candidate failed validation and was ignored.
    Invalid(ConsensusError),
}

#[derive(Default)]
struct ChainState {
    /// The accepted chain, genesis first.
    chain: Vec<Block>,
    /// Keys of every post on the chain, for duplicate rejection.
    accepted: BTreeSet<PostKey>,
    /// Pending posts in (timestamp, author) order.
    pool: BTreeMap<PostKey, Post>,
}

/// A miner's chain, accepted-post index and pending pool.
///
/// Callers must verify post signatures before admission; the state layer
/// enforces only the membership invariants.
#[derive(Default)]
pub struct MinerState {
    inner: RwLock<ChainState>,
}

impl MinerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the full chain, genesis first.
    pub fn chain(&self) -> Vec<Block> {
        self.inner.read().chain.clone()
    }

    /// Current chain length.
    pub fn chain_len(&self) -> usize {
        self.inner.read().chain.len()
    }

    /// Snapshot the pending pool in (timestamp, author) order.
    pub fn pending_posts(&self) -> Vec<Post> {
        self.inner.read().pool.values().cloned().collect()
    }

    /// Current counters, for logging.
    pub fn stats(&self) -> StateStats {
        let inner = self.inner.read();
        StateStats {
            chain_len: inner.chain.len(),
            accepted_posts: inner.accepted.len(),
            pending_posts: inner.pool.len(),
        }
    }

    /// Admit one user post to the pool. Rejects duplicates against both the
    /// chain and the pool.
    pub fn admit_post(&self, post: Post) -> StateResult<()> {
        let mut inner = self.inner.write();
        let key = post.key();
        if inner.accepted.contains(&key) {
            return Err(StateError::DuplicateOnChain);
        }
        if inner.pool.contains_key(&key) {
            return Err(StateError::DuplicateInPool);
        }
        inner.pool.insert(key, post);
        Ok(())
    }

    /// Merge a batch of peer posts into the pool, silently skipping any that
    /// are already on the chain or pending. Returns how many were new.
    pub fn merge_posts(&self, posts: Vec<Post>) -> usize {
        let mut inner = self.inner.write();
        let mut added = 0;
        for post in posts {
            let key = post.key();
            if inner.accepted.contains(&key) || inner.pool.contains_key(&key) {
                continue;
            }
            inner.pool.insert(key, post);
            added += 1;
        }
        added
    }

    /// Offer a candidate chain. A strictly longer, fully valid candidate
    /// replaces the local chain; the pool is rebuilt as the old pool minus
    /// newly accepted posts, plus posts from orphaned blocks that the new
    /// chain does not carry. Anything else leaves the state untouched.
    pub fn apply_broadcast(&self, candidate: Vec<Block>) -> BroadcastOutcome {
        let mut inner = self.inner.write();
        if candidate.len() <= inner.chain.len() {
            return BroadcastOutcome::NotLonger;
        }
        let accepted = match validate_chain(&candidate) {
            Ok(accepted) => accepted,
            Err(err) => return BroadcastOutcome::Invalid(err),
        };

        // previous pool minus posts the new chain accepted
        let mut pool: BTreeMap<PostKey, Post> = BTreeMap::new();
        for (key, post) in std::mem::take(&mut inner.pool) {
            if !accepted.contains(&key) {
                pool.insert(key, post);
            }
        }

        // posts on orphaned blocks return to the pool unless accepted anew.
        // the candidate is longer, so every shared-prefix index is in range.
        let mut shared = 0;
        while shared < inner.chain.len()
            && inner.chain[shared].header.digest() == candidate[shared].header.digest()
        {
            shared += 1;
        }
        for block in &inner.chain[shared..] {
            for post in &block.posts {
                let key = post.key();
                if !accepted.contains(&key) {
                    pool.insert(key, post.clone());
                }
            }
        }

        let length = candidate.len();
        inner.chain = candidate;
        inner.accepted = accepted;
        inner.pool = pool;
        BroadcastOutcome::Accepted { length }
    }

    /// Snapshot the inputs for one mining pass: the current tip and the
    /// oldest `max_posts` pending posts.
    pub fn mining_job(&self, max_posts: usize) -> MiningJob {
        let inner = self.inner.read();
        MiningJob {
            height: inner.chain.len(),
            prev_hash: inner
                .chain
                .last()
                .map(|block| block.header.digest())
                .unwrap_or_else(Digest32::zero),
            posts: inner.pool.values().take(max_posts).cloned().collect(),
        }
    }

    /// Commit a locally mined block, unless the chain moved since the
    /// snapshot was taken. On success returns the new chain for broadcast;
    /// on abort the block is dropped and its posts stay in the pool.
    pub fn commit_block(&self, block: Block, snapshot_height: usize) -> Option<Vec<Block>> {
        let mut inner = self.inner.write();
        if inner.chain.len() != snapshot_height {
            debug!(
                snapshot_height,
                chain_len = inner.chain.len(),
                "discarding mined block: chain moved during proof-of-work"
            );
            return None;
        }
        for post in &block.posts {
            let key = post.key();
            inner.pool.remove(&key);
            inner.accepted.insert(key);
        }
        inner.chain.push(block);
        Some(inner.chain.clone())
    }
}
