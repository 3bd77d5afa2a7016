//! Configuration management for `cdnhost.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── assets     # [assets]
//! │   ├── cdn        # [cdn]
//! │   ├── gzip       # [gzip]
//! │   └── storage    # [storage]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, diagnostics
//! │   └── field      # FieldPath, config_fields!
//! └── mod.rs         # Config (this file)
//! ```
//!
//! A [`Config`] is built once, validated, then shared read-only
//! (usually behind an `Arc`). Reconfiguring means building a new value.

pub mod section;
pub mod types;
mod util;

pub use section::{
    AssetsConfig, CdnConfig, CdnHost, GzipConfig, HostResolver, StorageConfig,
    StorageCredentials,
};
pub use types::{ConfigDiagnostic, ConfigDiagnostics, ConfigError, FieldPath};
pub use util::find_config_file;

use crate::log;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name.
pub const CONFIG_FILE: &str = "cdnhost.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing cdnhost.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// CDN host and url prefixes
    #[serde(default)]
    pub cdn: CdnConfig,

    /// Remote storage bucket
    #[serde(default)]
    pub storage: StorageConfig,

    /// Local asset layout
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Compressed variants
    #[serde(default)]
    pub gzip: GzipConfig,
}

/// Command-line overrides applied on top of the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub enable: Option<bool>,
    pub cname: Option<String>,
    pub root: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
}

impl Config {
    /// Find, parse, normalize and validate the config file.
    ///
    /// `config_name` is searched upward from the current directory. Any
    /// validation problem is fatal: a half-configured CDN must not serve.
    pub fn load(config_name: &Path, overrides: &Overrides) -> Result<Self, ConfigError> {
        let config_path = find_config_file(config_name)
            .ok_or_else(|| ConfigError::NotFound(config_name.to_path_buf()))?;

        let mut config = Self::from_path(&config_path)?;
        config.apply_overrides(overrides);
        config.config_path = crate::utils::path::normalize_path(&config_path);

        let base = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.finalize(&base)
    }

    /// Parse configuration from TOML string (no normalization/validation).
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} (ignored):", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Apply command-line overrides.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        Self::update_option(&mut self.cdn.enable, overrides.enable.as_ref());
        if let Some(cname) = &overrides.cname {
            self.cdn.cname = Some(cname.clone());
        }
        Self::update_option(&mut self.assets.root, overrides.root.as_ref());
        if let Some(manifest) = &overrides.manifest {
            self.assets.manifest = Some(manifest.clone());
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve relative paths against `base` and validate.
    ///
    /// Library users building a config in code call this once before
    /// handing it to [`crate::AssetHost`].
    pub fn finalize(mut self, base: &Path) -> Result<Self, ConfigError> {
        self.normalize_paths(base);
        self.validate()?;
        Ok(self)
    }

    /// Normalize all paths relative to the config directory.
    fn normalize_paths(&mut self, base: &Path) {
        let base = crate::utils::path::normalize_path(base);
        self.assets.normalize(&base);
        self.storage.normalize(&base);
    }

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        self.cdn.validate(&mut diag);
        self.storage.validate(self.cdn.enable, &mut diag);
        self.assets.validate(self.cdn.enable, &mut diag);
        self.gzip.validate(&mut diag);

        diag.into_result()
    }

    /// Asset root directory.
    #[inline]
    pub fn root(&self) -> &Path {
        &self.assets.root
    }

    /// Join a root-relative url path (`/images/a.png`) onto the asset root.
    pub fn root_join(&self, source: &str) -> PathBuf {
        crate::utils::path::clean_path(&self.assets.root.join(source.trim_start_matches('/')))
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> Config {
    let (parsed, ignored) = Config::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = Config::from_str("[cdn\nenable = true");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_not_enabled_by_default() {
        let config = Config::default();
        assert!(!config.cdn.enable);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[cdn]\ncname = \"assethost.com\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = Config::parse_with_ignored(content).unwrap();
        assert_eq!(config.cdn.cname.as_deref(), Some("assethost.com"));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_enabled_without_bucket_is_fatal() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("public")).unwrap();
        let config = test_parse_config("[cdn]\nenable = true\ncname = \"assethost.com\"");

        let err = config.finalize(dir.path()).unwrap_err();
        match err {
            ConfigError::Diagnostics(diag) => {
                assert_eq!(diag.errors()[0].field, StorageConfig::FIELDS.bucket);
            }
            other => panic!("expected diagnostics, got {other:?}"),
        }
    }

    #[test]
    fn test_finalize_resolves_root() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("public")).unwrap();
        let config = test_parse_config(
            "[cdn]\nenable = true\ncname = \"assethost.com\"\n[storage]\nbucket = \"bucketname\"",
        )
        .finalize(dir.path())
        .unwrap();

        assert!(config.root().is_absolute());
        assert!(config.root().ends_with("public"));
        assert_eq!(
            config.root_join("/images/../images/a.png"),
            config.root().join("images/a.png")
        );
    }

    #[test]
    fn test_load_with_overrides() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("www")).unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[cdn]\ncname = \"assethost.com\"\n[storage]\nbucket = \"b\"").unwrap();

        let overrides = Overrides {
            enable: Some(true),
            cname: Some("other.example.com".into()),
            root: Some(PathBuf::from("www")),
            manifest: None,
        };
        let config = Config::load(&path, &overrides).unwrap();
        assert!(config.cdn.enable);
        assert_eq!(config.cdn.cname.as_deref(), Some("other.example.com"));
        assert!(config.root().ends_with("www"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here/cdnhost.toml"), &Overrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
