//! # postnet-consensus
//!
//! Data model and consensus rules for the postnet chain.
//!
//! This crate provides:
//! - The chain data model: posts, block headers, blocks
//! - Canonical hashing (bincode encoding + SHA-256)
//! - RSA key generation and PKCS#1 v1.5 post signatures
//! - Proof-of-work target checking and a bounded solver
//! - Base64 wire encoding for JSON transport
//! - Whole-chain validation

mod block;
mod chain;
mod crypto;
mod error;
mod pow;
mod wire;

pub use block::{unix_nanos, Block, BlockHeader, Post, PostBody, PostKey};
pub use chain::validate_chain;
pub use crypto::{generate_key, hash, sign, AuthorKey, Digest32, PrivateKey};
pub use error::{ConsensusError, ConsensusResult};
pub use pow::{meets_target, try_solve};
pub use wire::{BlockJson, PostJson};

/// Mining difficulty: required number of leading zero bits in a block
/// header's hash. Calibrated so a block is found in seconds on one machine.
pub const TARGET: u32 = 20;

/// RSA modulus size for user keys.
pub const KEY_BITS: usize = 2048;
