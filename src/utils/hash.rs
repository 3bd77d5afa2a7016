//! Unified hashing utilities using FxHash.
//!
//! Uses `rustc_hash::FxHasher` for fast, deterministic hashing. Unlike
//! `std`'s `RandomState`, the result is stable across processes, so the
//! same asset path always lands on the same CDN shard.

use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Compute 64-bit hash from byte data.
#[inline]
pub fn compute<T: AsRef<[u8]> + ?Sized>(data: &T) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(data.as_ref());
    hasher.finish()
}

/// Pick a bucket in `0..count` for `data`. `count` of 0 is treated as 1.
#[inline]
pub fn bucket<T: AsRef<[u8]> + ?Sized>(data: &T, count: u32) -> u32 {
    (compute(data) % u64::from(count.max(1))) as u32
}
