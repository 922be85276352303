//! The miner's background routine: heartbeat, gossip and mining.

use crate::{
    HEARTBEAT_MAX_MS, HEARTBEAT_MIN_MS, MINING_ITERATIONS, POSTS_PER_BLOCK, SYNC_MAX_MS,
    SYNC_MIN_MS,
};
use futures::future::join_all;
use postnet_api::{BlockchainJson, PostsJson};
use postnet_consensus::{hash, try_solve, unix_nanos, Block, BlockHeader, BlockJson, PostJson};
use postnet_state::MinerState;
use postnet_tracker::{PortJson, PortsJson};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// The background routine of one miner.
///
/// Single-tasked by construction: each pass checks the shutdown flag, fires
/// whichever timers are due, then runs one bounded mining attempt. The
/// mining bound is what lets concurrently accepted broadcasts preempt
/// in-progress work.
pub(crate) struct Routine {
    port: u16,
    tracker_port: u16,
    state: Arc<MinerState>,
    client: reqwest::Client,
    shutdown: Arc<AtomicBool>,
    /// Live peers from the last successful heartbeat, excluding this miner.
    peers: Vec<u16>,
    heartbeat_interval: Duration,
    sync_interval: Duration,
}

impl Routine {
    pub(crate) fn new(
        port: u16,
        tracker_port: u16,
        state: Arc<MinerState>,
        client: reqwest::Client,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        let mut rng = rand::thread_rng();
        let heartbeat_interval =
            Duration::from_millis(rng.gen_range(HEARTBEAT_MIN_MS..HEARTBEAT_MAX_MS));
        let sync_interval = Duration::from_millis(rng.gen_range(SYNC_MIN_MS..SYNC_MAX_MS));
        Self {
            port,
            tracker_port,
            state,
            client,
            shutdown,
            peers: Vec::new(),
            heartbeat_interval,
            sync_interval,
        }
    }

    pub(crate) async fn run(mut self) {
        // register with the tracker immediately, then on every heartbeat
        self.heartbeat().await;
        let mut next_heartbeat = Instant::now() + self.heartbeat_interval;
        let mut next_sync = Instant::now() + self.sync_interval;

        while !self.shutdown.load(Ordering::SeqCst) {
            let now = Instant::now();
            if now >= next_heartbeat {
                self.heartbeat().await;
                next_heartbeat = Instant::now() + self.heartbeat_interval;
            }
            if now >= next_sync {
                self.gossip().await;
                next_sync = Instant::now() + self.sync_interval;
            }
            self.mine_once().await;
        }
        info!(port = self.port, "miner routine stopped");
    }

    /// Register with the tracker and refresh the peer list. Failures are
    /// transient; the next heartbeat retries.
    async fn heartbeat(&mut self) {
        let url = format!("http://127.0.0.1:{}/register", self.tracker_port);
        let request = PortJson { port: self.port };
        let response = match self.client.post(&url).json(&request).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!(port = self.port, status = %response.status(), "tracker rejected registration");
                self.peers.clear();
                return;
            }
            Err(err) => {
                warn!(port = self.port, error = %err, "failed to reach tracker");
                self.peers.clear();
                return;
            }
        };
        match response.json::<PortsJson>().await {
            Ok(body) => {
                self.peers = body
                    .ports
                    .into_iter()
                    .filter(|&peer| peer != self.port)
                    .collect();
            }
            Err(err) => {
                warn!(port = self.port, error = %err, "invalid registration response");
                self.peers.clear();
            }
        }
    }

    /// Send the pending pool to every peer in parallel. Empty pools are not
    /// gossiped.
    async fn gossip(&self) {
        let posts = self.state.pending_posts();
        if posts.is_empty() {
            return;
        }
        let request = PostsJson {
            posts: posts.iter().map(PostJson::encode).collect(),
        };
        join_all(
            self.peers
                .iter()
                .map(|&peer| self.sync_with(peer, &request)),
        )
        .await;
    }

    async fn sync_with(&self, peer: u16, request: &PostsJson) {
        let url = format!("http://127.0.0.1:{peer}/sync");
        match self.client.post(&url).json(request).send().await {
            Ok(response) if !response.status().is_success() => {
                warn!(port = self.port, peer, status = %response.status(), "peer rejected sync");
            }
            Ok(_) => {}
            Err(err) => {
                warn!(port = self.port, peer, error = %err, "failed to sync with peer");
            }
        }
    }

    /// One bounded mining attempt: snapshot the tip and pool prefix, search
    /// nonces off the runtime threads, then commit only if the chain has not
    /// moved. A committed block is broadcast to every peer in parallel.
    async fn mine_once(&self) {
        let job = self.state.mining_job(POSTS_PER_BLOCK);
        let mut header = BlockHeader {
            prev_hash: job.prev_hash,
            summary: hash(&job.posts),
            timestamp: unix_nanos(),
            nonce: 0,
        };
        let solved = tokio::task::spawn_blocking(move || {
            let found = try_solve(&mut header, MINING_ITERATIONS);
            (found, header)
        })
        .await;
        let header = match solved {
            Ok((true, header)) => header,
            Ok((false, _)) => return,
            Err(err) => {
                warn!(port = self.port, error = %err, "mining task failed");
                return;
            }
        };

        let block = Block {
            header,
            posts: job.posts,
        };
        let contents: Vec<&str> = block
            .posts
            .iter()
            .map(|post| post.body.content.as_str())
            .collect();
        let chain = match self.state.commit_block(block.clone(), job.height) {
            Some(chain) => chain,
            None => {
                // a broadcast won the race; the posts stay pending
                debug!(port = self.port, "discarded mined block after chain moved");
                return;
            }
        };
        info!(
            port = self.port,
            length = chain.len(),
            contents = ?contents,
            "mined a block"
        );

        let request = BlockchainJson {
            blockchain: chain.iter().map(BlockJson::encode).collect(),
        };
        join_all(
            self.peers
                .iter()
                .map(|&peer| self.broadcast_to(peer, &request)),
        )
        .await;
    }

    async fn broadcast_to(&self, peer: u16, request: &BlockchainJson) {
        let url = format!("http://127.0.0.1:{peer}/broadcast");
        match self.client.post(&url).json(request).send().await {
            Ok(response) if !response.status().is_success() => {
                warn!(port = self.port, peer, status = %response.status(), "peer rejected broadcast");
            }
            Ok(_) => {}
            Err(err) => {
                warn!(port = self.port, peer, error = %err, "failed to broadcast to peer");
            }
        }
    }
}
