//! Memoized content keys.
//!
//! Wraps [`key_for_path`] so repeated lookups of the same file skip the
//! read. An entry is reused only while the file's mtime and the requested
//! prefix match; anything else recomputes. [`KeyCache::clear`] is the hook
//! to call after reconfiguring.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use dashmap::DashMap;

use super::key_for_path;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
struct CachedKey {
    mtime: SystemTime,
    prefix: String,
    key: String,
}

/// Thread-safe cache of content keys, keyed by path.
#[derive(Debug, Default)]
pub struct KeyCache {
    keys: DashMap<PathBuf, CachedKey>,
}

impl KeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content key for `path`, stat'ing it to check freshness.
    pub fn key_for(&self, path: &Path, prefix: &str) -> Result<String> {
        let mtime = fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| Error::io(path, e))?;
        self.key_for_mtime(path, mtime, prefix)
    }

    /// Content key for `path` whose mtime the caller already has.
    pub fn key_for_mtime(&self, path: &Path, mtime: SystemTime, prefix: &str) -> Result<String> {
        if let Some(entry) = self.keys.get(path)
            && entry.mtime == mtime
            && entry.prefix == prefix
        {
            return Ok(entry.key.clone());
        }

        let key = key_for_path(path, prefix)?;
        self.keys.insert(
            path.to_path_buf(),
            CachedKey {
                mtime,
                prefix: prefix.to_string(),
                key: key.clone(),
            },
        );
        Ok(key)
    }

    pub fn invalidate(&self, path: &Path) {
        self.keys.remove(path);
    }

    pub fn clear(&self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
