//! The user client.

use crate::{ClientError, ClientResult, RW_COUNT};
use futures::future::join_all;
use postnet_api::BlockchainJson;
use postnet_consensus::{
    generate_key, validate_chain, AuthorKey, Block, Post, PostJson, PostKey, PrivateKey,
};
use postnet_tracker::PortsJson;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use tracing::debug;

/// A user: a key pair plus the tracker it discovers miners through.
pub struct User {
    key: PrivateKey,
    tracker_port: u16,
    client: reqwest::Client,
}

impl User {
    /// Create a user with a freshly generated RSA key pair.
    pub fn new(tracker_port: u16) -> Self {
        Self {
            key: generate_key(),
            tracker_port,
            client: reqwest::Client::new(),
        }
    }

    /// This user's public identity.
    pub fn author(&self) -> AuthorKey {
        AuthorKey::from(&self.key)
    }

    /// Ask the tracker for the live miners and pick a random subset of at
    /// most [`RW_COUNT`].
    pub async fn random_miners(&self) -> ClientResult<Vec<u16>> {
        let url = format!("http://127.0.0.1:{}/get_miners", self.tracker_port);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::NoMiners);
        }
        let mut ports = response
            .json::<PortsJson>()
            .await
            .map_err(|_| ClientError::NoMiners)?
            .ports;
        if ports.len() > RW_COUNT {
            ports.shuffle(&mut rand::thread_rng());
            ports.truncate(RW_COUNT);
        }
        Ok(ports)
    }

    /// Sign a post with the current timestamp and send it concurrently to a
    /// random miner subset. The first error observed is returned once every
    /// request has completed.
    pub async fn write_post(&self, content: &str) -> ClientResult<()> {
        let post = Post::signed(&self.key, content);
        let encoded = PostJson::encode(&post);
        let miners = self.random_miners().await?;
        let results = join_all(
            miners
                .iter()
                .map(|&port| self.write_to(port, &encoded)),
        )
        .await;
        results.into_iter().find(Result::is_err).unwrap_or(Ok(()))
    }

    /// Fetch chains from a random miner subset and return the posts of the
    /// longest chain that passes full validation, in (timestamp, author)
    /// order.
    pub async fn read_posts(&self) -> ClientResult<Vec<Post>> {
        let miners = self.random_miners().await?;
        let mut chains: Vec<Vec<Block>> =
            join_all(miners.iter().map(|&port| self.fetch_chain(port)))
                .await
                .into_iter()
                .flatten()
                .collect();
        chains.sort_by(|a, b| b.len().cmp(&a.len()));

        for chain in chains {
            if chain.is_empty() {
                continue;
            }
            if validate_chain(&chain).is_err() {
                debug!("skipping a miner chain that failed validation");
                continue;
            }
            let mut posts: BTreeMap<PostKey, Post> = BTreeMap::new();
            for block in &chain {
                for post in &block.posts {
                    posts.insert(post.key(), post.clone());
                }
            }
            return Ok(posts.into_values().collect());
        }
        Err(ClientError::NoValidChain)
    }

    async fn write_to(&self, port: u16, encoded: &PostJson) -> ClientResult<()> {
        let url = format!("http://127.0.0.1:{port}/write");
        let response = self.client.post(&url).json(encoded).send().await?;
        if !response.status().is_success() {
            return Err(ClientError::Rejected {
                port,
                status: response.status(),
            });
        }
        Ok(())
    }

    /// Fetch and decode one miner's chain; any failure yields `None` so a
    /// single bad miner cannot poison a read.
    async fn fetch_chain(&self, port: u16) -> Option<Vec<Block>> {
        let url = format!("http://127.0.0.1:{port}/read");
        let response = self.client.get(&url).send().await.ok()?;
        let body = response.json::<BlockchainJson>().await.ok()?;
        body.blockchain
            .iter()
            .map(|block| block.decode().ok())
            .collect()
    }
}
