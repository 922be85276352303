//! Posts, block headers and blocks.

use crate::crypto::{self, AuthorKey, Digest32, PrivateKey};
use crate::pow;
use crate::TARGET;
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds since the unix epoch. Post timestamps are taken at signing
/// time and are assumed unique per author.
pub fn unix_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .as_nanos() as i64
}

/// The signed part of a post: the content and its signing-time timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostBody {
    pub content: String,
    pub timestamp: i64,
}

/// A user post: body, author public key, and a signature over the body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub author: AuthorKey,
    pub body: PostBody,
    pub signature: Vec<u8>,
}

impl Post {
    /// Build and sign a post with the current timestamp.
    pub fn signed(key: &PrivateKey, content: impl Into<String>) -> Self {
        let body = PostBody {
            content: content.into(),
            timestamp: unix_nanos(),
        };
        let signature = crypto::sign(key, &body);
        Self {
            author: AuthorKey::from(key),
            body,
            signature,
        }
    }

    /// A post is valid iff its signature verifies against the stated author.
    pub fn verify(&self) -> bool {
        self.author.verify(&self.body, &self.signature)
    }

    /// Identity key for pool and index membership: (timestamp, author bytes).
    pub fn key(&self) -> PostKey {
        PostKey {
            timestamp: self.body.timestamp,
            author: self.author.to_bytes(),
        }
    }
}

/// Total order over posts: timestamp ascending, then author key bytes.
/// Duplicates are detected on this pair; the content is not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PostKey {
    pub timestamp: i64,
    pub author: Vec<u8>,
}

/// Header of a block; the proof-of-work hash is taken over this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockHeader {
    /// Hash of the previous block's header; all zero for the genesis block.
    pub prev_hash: Digest32,
    /// Hash of the ordered post list carried by the block.
    pub summary: Digest32,
    pub timestamp: i64,
    pub nonce: u32,
}

impl BlockHeader {
    /// The header's own hash, as linked to by the next block.
    pub fn digest(&self) -> Digest32 {
        crypto::hash(self)
    }
}

/// A mined block: header plus the ordered posts it commits to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub header: BlockHeader,
    pub posts: Vec<Post>,
}

impl Block {
    /// A block is valid iff every post verifies, the summary commits to the
    /// post list, and the header hash meets the difficulty target.
    pub fn verify(&self) -> bool {
        self.posts.iter().all(Post::verify)
            && self.header.summary == crypto::hash(&self.posts)
            && pow::meets_target(&self.header.digest(), TARGET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_key;

    #[test]
    fn post_sign_and_tamper() {
        let key = generate_key();
        let mut post = Post::signed(&key, "Hello World");
        assert!(post.verify());

        // tampering with the content must break the signature
        post.body.content = "Bye World".to_string();
        assert!(!post.verify());

        // and so must tampering with the timestamp
        post.body.content = "Hello World".to_string();
        post.body.timestamp = unix_nanos();
        assert!(!post.verify());
    }

    #[test]
    fn post_key_orders_by_timestamp_then_author() {
        let a = PostKey {
            timestamp: 1,
            author: vec![9, 9],
        };
        let b = PostKey {
            timestamp: 2,
            author: vec![0],
        };
        let c = PostKey {
            timestamp: 2,
            author: vec![1],
        };
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn posts_with_same_author_and_timestamp_share_a_key() {
        let key = generate_key();
        let post = Post::signed(&key, "one");
        let mut other = post.clone();
        other.body.content = "two".to_string();
        assert_eq!(post.key(), other.key());
    }
}
