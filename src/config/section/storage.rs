//! `[storage]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [storage]
//! bucket = "my-assets"
//! key_prefix = ""                 # prepended to every content key
//! host_domain = "s3.amazonaws.com"
//! credentials = "config/s3.toml"  # optional, checked at load time
//! ```
//!
//! The credentials file is owned by the uploader; it is only checked for
//! shape here so a broken deploy setup fails before anything is served:
//!
//! ```toml
//! access_key_id = "AKIA..."
//! secret_access_key = "..."
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;
use crate::config_fields;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Bucket name. Required while the CDN is enabled.
    pub bucket: Option<String>,

    /// Prefix for content keys, e.g. `"assets/"`.
    pub key_prefix: String,

    /// Storage provider domain used to build `<bucket>.<host_domain>`.
    pub host_domain: String,

    /// Path to the uploader's credentials file.
    pub credentials: Option<PathBuf>,
}

config_fields!(StorageConfig => StorageFields, "storage" {
    bucket, key_prefix, host_domain, credentials,
});

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            key_prefix: String::new(),
            host_domain: "s3.amazonaws.com".into(),
            credentials: None,
        }
    }
}

/// Shape of the credentials file.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl StorageConfig {
    /// Bucket name, ignoring blank values.
    pub fn bucket_name(&self) -> Option<&str> {
        self.bucket.as_deref().map(str::trim).filter(|b| !b.is_empty())
    }

    /// `<bucket>.<host_domain>`, the host used when no cname is configured.
    pub fn bucket_host(&self) -> Option<String> {
        self.bucket_name()
            .map(|bucket| format!("{bucket}.{}", self.host_domain))
    }

    /// Resolve `credentials` against the config directory.
    pub fn normalize(&mut self, root: &Path) {
        if let Some(path) = self.credentials.take() {
            self.credentials = Some(crate::utils::path::normalize_path(&root.join(path)));
        }
    }

    /// Load and check the credentials file, if one is configured.
    pub fn load_credentials(&self) -> Result<Option<StorageCredentials>, String> {
        let Some(path) = &self.credentials else {
            return Ok(None);
        };
        let content = fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        let creds: StorageCredentials =
            toml::from_str(&content).map_err(|e| format!("cannot parse {}: {e}", path.display()))?;
        if creds.access_key_id.trim().is_empty() || creds.secret_access_key.trim().is_empty() {
            return Err(format!("{} has empty keys", path.display()));
        }
        Ok(Some(creds))
    }

    pub fn validate(&self, cdn_enabled: bool, diag: &mut ConfigDiagnostics) {
        if cdn_enabled && self.bucket_name().is_none() {
            diag.error_with_hint(
                Self::FIELDS.bucket,
                format!("{} must be set while the CDN is enabled", Self::FIELDS.bucket),
                "add `bucket = \"...\"` under [storage]",
            );
        }

        if let Err(message) = self.load_credentials() {
            diag.error_with_hint(
                Self::FIELDS.credentials,
                message,
                "expected `access_key_id` and `secret_access_key`",
            );
        }
    }
}
