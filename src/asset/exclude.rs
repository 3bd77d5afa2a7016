//! Per-source CDN opt-out.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

/// Sources that must be served locally even when uploaded.
pub trait CdnExclusion: Send + Sync {
    fn is_excluded(&self, source: &str) -> bool;
}

/// Excludes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExclusion;

impl CdnExclusion for NoExclusion {
    fn is_excluded(&self, _source: &str) -> bool {
        false
    }
}

impl<F> CdnExclusion for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_excluded(&self, source: &str) -> bool {
        self(source)
    }
}

/// gitignore-style patterns, relative to the asset root.
///
/// Accepts root-relative sources (`/images/a.png`) and absolute paths under
/// the root. `images/uploads` also excludes everything below it.
#[derive(Debug, Clone)]
pub struct GlobExclusion {
    root: std::path::PathBuf,
    matcher: Gitignore,
}

impl GlobExclusion {
    pub fn new(root: &Path, patterns: &[String]) -> Result<Self, ignore::Error> {
        let mut builder = GitignoreBuilder::new(root);
        for pattern in patterns {
            builder.add_line(None, pattern)?;
        }
        Ok(Self {
            root: root.to_path_buf(),
            matcher: builder.build()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.matcher.is_empty()
    }
}

impl CdnExclusion for GlobExclusion {
    fn is_excluded(&self, source: &str) -> bool {
        if self.matcher.is_empty() {
            return false;
        }
        let path = Path::new(source);
        let relative = path
            .strip_prefix(&self.root)
            .unwrap_or_else(|_| Path::new(source.trim_start_matches('/')));
        if relative.as_os_str().is_empty() {
            return false;
        }
        self.matcher
            .matched_path_or_any_parents(relative, false)
            .is_ignore()
    }
}
