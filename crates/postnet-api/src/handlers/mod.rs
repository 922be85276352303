//! Request handlers.

pub mod chain;
pub mod posts;
