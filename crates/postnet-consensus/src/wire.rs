//! Base64 wire encoding for JSON transport.
//!
//! Binary fields (author key, signature, digests) travel as standard base64
//! strings inside JSON. Encoding is total and invertible; decoding fails on
//! malformed base64 or inconsistent lengths, and that failure surfaces to
//! callers as a request rejection.

use crate::block::{Block, BlockHeader, Post, PostBody};
use crate::crypto::{AuthorKey, Digest32};
use crate::error::{ConsensusError, ConsensusResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Wire form of a [`Post`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostJson {
    pub author: String,
    pub content: String,
    pub timestamp: i64,
    pub signature: String,
}

impl PostJson {
    /// Encode a post for transport.
    pub fn encode(post: &Post) -> Self {
        Self {
            author: STANDARD.encode(post.author.to_bytes()),
            content: post.body.content.clone(),
            timestamp: post.body.timestamp,
            signature: STANDARD.encode(&post.signature),
        }
    }

    /// Decode a post received from the wire.
    pub fn decode(&self) -> ConsensusResult<Post> {
        let author_bytes = STANDARD
            .decode(&self.author)
            .map_err(|_| ConsensusError::Base64("author"))?;
        let author = AuthorKey::from_bytes(&author_bytes)?;
        let signature = STANDARD
            .decode(&self.signature)
            .map_err(|_| ConsensusError::Base64("signature"))?;
        Ok(Post {
            author,
            body: PostBody {
                content: self.content.clone(),
                timestamp: self.timestamp,
            },
            signature,
        })
    }
}

/// Wire form of a [`Block`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockJson {
    pub prev_hash: String,
    pub summary: String,
    pub timestamp: i64,
    pub nonce: u32,
    pub posts: Vec<PostJson>,
}

impl BlockJson {
    /// Encode a block for transport.
    pub fn encode(block: &Block) -> Self {
        Self {
            prev_hash: STANDARD.encode(block.header.prev_hash),
            summary: STANDARD.encode(block.header.summary),
            timestamp: block.header.timestamp,
            nonce: block.header.nonce,
            posts: block.posts.iter().map(PostJson::encode).collect(),
        }
    }

    /// Decode a block received from the wire.
    pub fn decode(&self) -> ConsensusResult<Block> {
        Ok(Block {
            header: BlockHeader {
                prev_hash: decode_digest(&self.prev_hash, "prev_hash")?,
                summary: decode_digest(&self.summary, "summary")?,
                timestamp: self.timestamp,
                nonce: self.nonce,
            },
            posts: self
                .posts
                .iter()
                .map(PostJson::decode)
                .collect::<ConsensusResult<_>>()?,
        })
    }
}

fn decode_digest(value: &str, field: &'static str) -> ConsensusResult<Digest32> {
    let bytes = STANDARD
        .decode(value)
        .map_err(|_| ConsensusError::Base64(field))?;
    let bytes: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| ConsensusError::DigestLength(field))?;
    Ok(Digest32(bytes))
}
