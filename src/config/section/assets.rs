//! `[assets]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [assets]
//! root = "public"                                 # asset root, relative to cdnhost.toml
//! dirs = ["images", "javascripts", "stylesheets"] # top-level asset directories
//! stylesheets = "stylesheets"                     # where `cdnhost css` looks for *.css
//! fallback_host = "www.example.com"               # host for locally served assets
//! exclude = ["images/uploads/**"]                 # never served from the CDN
//! manifest = "uploaded.json"                      # remote asset index (JSON list)
//! timestamp_fallback = false                      # local assets get ?<mtime>
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::asset::GlobExclusion;
use crate::config::ConfigDiagnostics;
use crate::config::section::cdn::has_scheme;
use crate::config_fields;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Asset root (the web server's public directory).
    pub root: PathBuf,

    /// Top-level directories under `root` that hold assets.
    pub dirs: Vec<String>,

    /// Stylesheet directory, relative to `root`.
    pub stylesheets: PathBuf,

    /// Host for assets not served from the CDN.
    pub fallback_host: Option<String>,

    /// gitignore-style patterns (relative to `root`) kept off the CDN.
    pub exclude: Vec<String>,

    /// JSON file listing the paths already uploaded.
    pub manifest: Option<PathBuf>,

    /// Append `?<mtime>` to locally served assets.
    pub timestamp_fallback: bool,
}

config_fields!(AssetsConfig => AssetsFields, "assets" {
    root, dirs, stylesheets, fallback_host, exclude, manifest, timestamp_fallback,
});

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("public"),
            dirs: vec!["images".into(), "javascripts".into(), "stylesheets".into()],
            stylesheets: PathBuf::from("stylesheets"),
            fallback_host: None,
            exclude: Vec::new(),
            manifest: None,
            timestamp_fallback: false,
        }
    }
}

impl AssetsConfig {
    /// Absolute stylesheet directory.
    pub fn stylesheets_dir(&self) -> PathBuf {
        self.root.join(&self.stylesheets)
    }

    /// Fallback host, ignoring blank values.
    pub fn fallback_host(&self) -> Option<&str> {
        self.fallback_host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }

    /// Whether a root-relative source lives in one of the asset dirs.
    ///
    /// ```ignore
    /// assert!(assets.is_asset_source("/images/logo.png"));
    /// assert!(!assets.is_asset_source("/robots.txt"));
    /// ```
    pub fn is_asset_source(&self, source: &str) -> bool {
        let first = source.trim_start_matches('/').split('/').next().unwrap_or("");
        self.dirs.iter().any(|dir| dir.trim_matches('/') == first)
    }

    /// Normalize paths relative to the config directory.
    pub fn normalize(&mut self, root: &Path) {
        self.root = crate::utils::path::normalize_path(&root.join(&self.root));
        if let Some(manifest) = self.manifest.take() {
            self.manifest = Some(crate::utils::path::normalize_path(&root.join(manifest)));
        }
    }

    pub fn validate(&self, cdn_enabled: bool, diag: &mut ConfigDiagnostics) {
        if cdn_enabled && !self.root.is_dir() {
            diag.error(
                Self::FIELDS.root,
                format!("{} is not a directory: {}", Self::FIELDS.root, self.root.display()),
            );
        }

        for (idx, dir) in self.dirs.iter().enumerate() {
            let name = dir.trim_matches('/');
            if name.is_empty() || name.contains('/') {
                diag.error(
                    Self::FIELDS.dirs,
                    format!("[{idx}] `{dir}` must be a single directory name"),
                );
            }
        }

        if self.stylesheets.is_absolute() {
            diag.error_with_hint(
                Self::FIELDS.stylesheets,
                format!("{} must be relative to the asset root", Self::FIELDS.stylesheets),
                "use e.g. `stylesheets = \"stylesheets\"`",
            );
        }

        if let Some(host) = self.fallback_host()
            && has_scheme(host)
        {
            diag.error_with_hint(
                Self::FIELDS.fallback_host,
                format!("{} must be a host name, got `{host}`", Self::FIELDS.fallback_host),
                "drop the scheme; http/https is chosen per request",
            );
        }

        if let Err(e) = GlobExclusion::new(&self.root, &self.exclude) {
            diag.error(Self::FIELDS.exclude, format!("invalid pattern: {e}"));
        }

        if let Some(manifest) = &self.manifest
            && !manifest.is_file()
        {
            diag.error(
                Self::FIELDS.manifest,
                format!("{} file not found: {}", Self::FIELDS.manifest, manifest.display()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use tempfile::TempDir;

    #[test]
    fn test_assets_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.assets.dirs, ["images", "javascripts", "stylesheets"]);
        assert_eq!(config.assets.root, PathBuf::from("public"));
        assert!(config.assets.fallback_host().is_none());
        assert!(!config.assets.timestamp_fallback);
    }

    #[test]
    fn test_custom_asset_dirs() {
        let config = test_parse_config("[assets]\ndirs = [\"custom\"]");
        assert_eq!(config.assets.dirs, ["custom"]);
        assert!(config.assets.is_asset_source("/custom/a.png"));
        assert!(!config.assets.is_asset_source("/images/a.png"));
    }

    #[test]
    fn test_is_asset_source() {
        let config = test_parse_config("");
        assert!(config.assets.is_asset_source("/images/logo.png"));
        assert!(config.assets.is_asset_source("javascripts/app.js"));
        assert!(!config.assets.is_asset_source("/robots.txt"));
        assert!(!config.assets.is_asset_source("/imagesx/logo.png"));
    }

    #[test]
    fn test_normalize_and_validate_root() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("public")).unwrap();

        let mut config = test_parse_config("[assets]\nfallback_host = \"www.example.com\"");
        config.assets.normalize(dir.path());
        assert!(config.assets.root.is_absolute());
        assert!(config.assets.stylesheets_dir().ends_with("public/stylesheets"));

        let mut diag = ConfigDiagnostics::new();
        config.assets.validate(true, &mut diag);
        assert!(diag.is_empty(), "{diag}");
    }

    #[test]
    fn test_validate_reports_each_problem() {
        let dir = TempDir::new().unwrap();
        let mut config = test_parse_config(
            "[assets]\ndirs = [\"a/b\"]\nfallback_host = \"http://www.example.com\"\nmanifest = \"missing.json\"",
        );
        config.assets.normalize(dir.path());

        let mut diag = ConfigDiagnostics::new();
        config.assets.validate(true, &mut diag);
        let fields: Vec<_> = diag.errors().iter().map(|e| e.field).collect();
        assert!(fields.contains(&AssetsConfig::FIELDS.root));
        assert!(fields.contains(&AssetsConfig::FIELDS.dirs));
        assert!(fields.contains(&AssetsConfig::FIELDS.fallback_host));
        assert!(fields.contains(&AssetsConfig::FIELDS.manifest));
    }
}
