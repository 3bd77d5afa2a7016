//! Small shared helpers.
//!
//! - [`hash`]: fast non-cryptographic hashing (shard selection)
//! - [`path`]: lexical path normalization and url-token helpers

pub mod hash;
pub mod path;
