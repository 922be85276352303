//! # postnet-tests
//!
//! Integration tests for postnet.
//!
//! This crate provides:
//! - A harness for spawning trackers and miners on fresh ports
//! - A partition-aware tracker for fork/merge scenarios
//! - API tests driven through the router in-process
//! - Property-based tests for the data model
//! - Multi-node system scenarios

pub mod generators;
pub mod harness;
pub mod partition;

#[cfg(test)]
mod api_tests;

#[cfg(test)]
mod chain_tests;




pub use generators::*;
pub use harness::*;
pub use partition::PartitionTracker;
