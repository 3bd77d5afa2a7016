//! Remote asset index: which local files are already in the bucket.
//!
//! The uploader owns this set and refreshes it on its own schedule; the
//! rewriters only ask membership questions. A file outside the index is
//! always served locally.

use std::collections::HashSet;
use std::fs;
use std::hash::BuildHasher;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::config::ConfigError;
use crate::utils::path::clean_path;

/// Membership test over absolute local paths.
pub trait RemoteAssetIndex: Send + Sync {
    fn contains(&self, path: &Path) -> bool;
}

impl<F> RemoteAssetIndex for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn contains(&self, path: &Path) -> bool {
        self(path)
    }
}

/// Paths are matched as given; clean them before inserting.
impl<S> RemoteAssetIndex for HashSet<PathBuf, S>
where
    S: BuildHasher + Send + Sync,
{
    fn contains(&self, path: &Path) -> bool {
        HashSet::contains(self, path)
    }
}

/// In-memory index of uploaded paths.
#[derive(Debug, Clone, Default)]
pub struct RemotePaths {
    paths: FxHashSet<PathBuf>,
}

impl RemotePaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON manifest: an array of paths relative to `root`.
    ///
    /// ```json
    /// ["images/image.png", "/javascripts/application.js"]
    /// ```
    pub fn load_manifest(manifest: &Path, root: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(manifest)
            .map_err(|e| ConfigError::Io(manifest.to_path_buf(), e))?;
        let entries: Vec<String> = serde_json::from_str(&content).map_err(|e| {
            ConfigError::Validation(format!("invalid manifest {}: {e}", manifest.display()))
        })?;

        Ok(entries
            .iter()
            .map(|entry| root.join(entry.trim_start_matches('/')))
            .collect())
    }

    pub fn insert(&mut self, path: impl AsRef<Path>) -> bool {
        self.paths.insert(clean_path(path.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}

impl<P: AsRef<Path>> FromIterator<P> for RemotePaths {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut index = Self::new();
        for path in iter {
            index.insert(path);
        }
        index
    }
}

impl RemoteAssetIndex for RemotePaths {
    fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }
}
