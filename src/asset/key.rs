//! Content keys for cache busting.
//!
//! A key is the first [`KEY_LEN`] hex chars of the file's md5 digest,
//! optionally prefixed. Same bytes give the same key wherever the file
//! lives; touching a file without changing it keeps the key, unlike an
//! mtime-based version.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::error::{Error, Result};

/// Hex chars kept from the digest.
pub const KEY_LEN: usize = 9;

/// Key for content already in memory.
pub fn key_for_bytes(content: &[u8], prefix: &str) -> String {
    let digest = md5::compute(content);
    format_key(digest, prefix)
}

/// Key for the file at `path` (full read, streamed through the digest).
///
/// # Errors
///
/// [`Error::NotFound`] if the file doesn't exist, [`Error::Io`] if reading fails.
pub fn key_for_path(path: &Path, prefix: &str) -> Result<String> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;

    let mut reader = BufReader::with_capacity(64 * 1024, file);
    let mut context = md5::Context::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => context.consume(&buffer[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(Error::io(path, e)),
        }
    }

    Ok(format_key(context.compute(), prefix))
}

fn format_key(digest: md5::Digest, prefix: &str) -> String {
    let hex = format!("{digest:x}");
    format!("{prefix}{}", &hex[..KEY_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_file_key() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("image.png");
        fs::write(&file, "").unwrap();

        assert_eq!(key_for_path(&file, "").unwrap(), "d41d8cd98");
    }

    #[test]
    fn test_key_matches_md5_prefix() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("hello.txt");
        fs::write(&file, "hello world").unwrap();

        // md5("hello world") = 5eb63bbbe01eeed093cb22bb8f5acdc3
        assert_eq!(key_for_path(&file, "").unwrap(), "5eb63bbbe");
        assert_eq!(key_for_bytes(b"hello world", ""), "5eb63bbbe");
    }

    #[test]
    fn test_key_is_stable() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("application.js");
        fs::write(&file, "console.log(1)").unwrap();

        let k1 = key_for_path(&file, "").unwrap();
        let k2 = key_for_path(&file, "").unwrap();
        assert_eq!(k1, k2);
        assert_eq!(k1.len(), KEY_LEN);
        assert!(k1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_same_content_anywhere_same_key() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.css");
        fs::create_dir(dir.path().join("nested")).unwrap();
        let b = dir.path().join("nested/b.css");
        fs::write(&a, "body {}").unwrap();
        fs::write(&b, "body {}").unwrap();

        assert_eq!(key_for_path(&a, "").unwrap(), key_for_path(&b, "").unwrap());
    }

    #[test]
    fn test_different_content_different_key() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("app.js");
        fs::write(&file, "console.log(1)").unwrap();
        let k1 = key_for_path(&file, "").unwrap();

        fs::write(&file, "console.log(2)").unwrap();
        let k2 = key_for_path(&file, "").unwrap();
        assert_ne!(k1, k2);
    }

    #[test]
    fn test_prefix_is_prepended() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("application.js");
        fs::write(&file, "alert('hi')").unwrap();

        let plain = key_for_path(&file, "").unwrap();
        assert_eq!(key_for_path(&file, "prefix/").unwrap(), format!("prefix/{plain}"));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = key_for_path(Path::new("/nonexistent/file.png"), "").unwrap_err();
        assert!(err.is_not_found());
    }
}
