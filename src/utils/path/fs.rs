//! Path normalization utilities.
//!
//! - `normalize_path` - file system paths (canonicalize + fallback)
//! - `clean_path` - lexical `.`/`..` resolution, no filesystem access
//! - `url_path_under` - `/`-separated url path of a file below a root

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Resolve `.` and `..` components without touching the filesystem.
///
/// Works on paths that don't exist, which `canonicalize` refuses. `..`
/// above the root is dropped, the same way a shell expands `/../a` to `/a`.
///
/// # Example
/// ```ignore
/// clean_path(Path::new("/site/public/stylesheets/../images/bg.png"))
///     // -> /site/public/images/bg.png
/// ```
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // keep leading `..` on relative paths
                let at_parent = matches!(out.components().next_back(), Some(Component::ParentDir));
                if at_parent || (!out.pop() && !out.has_root()) {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Url path (`/images/logo.png`) of `path` relative to `root`.
///
/// Returns `None` when `path` is not below `root`.
pub fn url_path_under(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut url = String::new();
    for component in rel.components() {
        if let Component::Normal(part) = component {
            url.push('/');
            url.push_str(&part.to_string_lossy());
        }
    }
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_clean_path_parent_dirs() {
        assert_eq!(
            clean_path(Path::new("/site/public/stylesheets/../images/./bg.png")),
            PathBuf::from("/site/public/images/bg.png")
        );
        assert_eq!(clean_path(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(clean_path(Path::new("../a/b/..")), PathBuf::from("../a"));
        assert_eq!(clean_path(Path::new("../../a")), PathBuf::from("../../a"));
    }

    #[test]
    fn test_url_path_under() {
        let root = Path::new("/site/public");
        assert_eq!(
            url_path_under(Path::new("/site/public/images/image.png"), root).as_deref(),
            Some("/images/image.png")
        );
        assert_eq!(url_path_under(Path::new("/elsewhere/x.png"), root), None);
    }
}
