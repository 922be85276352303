//! Test harness for integration tests.
//!
//! Provides fresh port allocation, node fixtures and HTTP helpers for
//! driving a running deployment from tests.

use postnet_api::BlockchainJson;
use postnet_consensus::{generate_key, Block, Post, PostJson};
use postnet_miner::Miner;
use std::future::Future;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Ports are handed out sequentially so concurrent tests never collide.
static NEXT_PORT: AtomicU16 = AtomicU16::new(21000);

/// Allocate a fresh localhost port.
pub fn next_port() -> u16 {
    NEXT_PORT.fetch_add(1, Ordering::SeqCst)
}

/// Allocate a block of consecutive ports.
pub fn next_ports(count: u16) -> Vec<u16> {
    let first = NEXT_PORT.fetch_add(count, Ordering::SeqCst);
    (first..first + count).collect()
}

/// Multi-node scenarios saturate the CPU with mining; run them one at a
/// time so they do not starve each other.
pub async fn system_test_guard() -> tokio::sync::MutexGuard<'static, ()> {
    static LOCK: OnceLock<tokio::sync::Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| tokio::sync::Mutex::new(())).lock().await
}

/// Spawn `count` miners on fresh consecutive ports.
pub async fn spawn_miners(tracker_port: u16, count: u16) -> Vec<Miner> {
    let mut miners = Vec::with_capacity(count as usize);
    for port in next_ports(count) {
        let miner = Miner::start(port, tracker_port)
            .await
            .expect("failed to start miner");
        miners.push(miner);
    }
    miners
}

/// Shut down a set of miners.
pub async fn shutdown_all(miners: Vec<Miner>) {
    for miner in miners {
        miner.shutdown().await;
    }
}

/// Fetch and decode one miner's chain; `None` on any failure.
pub async fn read_blockchain(port: u16) -> Option<Vec<Block>> {
    let url = format!("http://127.0.0.1:{port}/read");
    let response = reqwest::get(&url).await.ok()?;
    let body = response.json::<BlockchainJson>().await.ok()?;
    body.blockchain
        .iter()
        .map(|block| block.decode().ok())
        .collect()
}

/// Sign a post with a throwaway key and submit it to one miner.
pub async fn write_blockchain(port: u16, content: &str) {
    let key = generate_key();
    let post = Post::signed(&key, content);
    let response = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{port}/write"))
        .json(&PostJson::encode(&post))
        .send()
        .await
        .expect("failed to reach miner");
    assert!(
        response.status().is_success(),
        "miner {port} rejected post: {}",
        response.status()
    );
}

/// All posts carried by a chain, in chain order.
pub fn chain_posts(chain: &[Block]) -> Vec<Post> {
    chain.iter().flat_map(|block| block.posts.clone()).collect()
}

/// Poll a condition until it holds or the timeout elapses.
pub async fn eventually<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if check().await {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
}
