//! `[gzip]` section configuration.
//!
//! Clients that accept gzip get a `/<prefix>` segment after the CDN host,
//! pointing at pre-compressed copies of eligible files.
//!
//! # Example
//!
//! ```toml
//! [gzip]
//! enable = true
//! prefix = "gz"
//! extensions = ["js", "css"]
//! ```

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;
use crate::config_fields;
use crate::utils::path::route::extension_of;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GzipConfig {
    pub enable: bool,

    /// Url segment in front of the compressed copies.
    pub prefix: String,

    /// File extensions that have compressed copies.
    pub extensions: Vec<String>,
}

config_fields!(GzipConfig => GzipFields, "gzip" { enable, prefix, extensions });

impl Default for GzipConfig {
    fn default() -> Self {
        Self {
            enable: true,
            prefix: "gz".into(),
            extensions: vec!["js".into(), "css".into()],
        }
    }
}

impl GzipConfig {
    /// Suffix segment, if compressed urls are in use at all.
    pub fn suffix(&self) -> Option<&str> {
        (self.enable && !self.prefix.is_empty()).then_some(self.prefix.as_str())
    }

    /// Whether `source` has a compressed copy.
    pub fn allows(&self, source: &str) -> bool {
        extension_of(source).is_some_and(|ext| {
            self.extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(&ext))
        })
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.enable && self.prefix.trim_matches('/').is_empty() {
            diag.error_with_hint(
                Self::FIELDS.prefix,
                format!("{} must not be empty while gzip is enabled", Self::FIELDS.prefix),
                "set `prefix = \"gz\"` or `enable = false`",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_gzip_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.gzip.suffix(), Some("gz"));
        assert!(config.gzip.allows("/javascripts/application.js"));
        assert!(config.gzip.allows("/stylesheets/site.CSS"));
        assert!(!config.gzip.allows("/images/logo.png"));
    }

    #[test]
    fn test_gzip_disabled_has_no_suffix() {
        let config = test_parse_config("[gzip]\nenable = false");
        assert_eq!(config.gzip.suffix(), None);
    }

    #[test]
    fn test_gzip_empty_prefix_is_error() {
        let config = test_parse_config("[gzip]\nprefix = \"\"");
        let mut diag = ConfigDiagnostics::new();
        config.gzip.validate(&mut diag);
        assert_eq!(diag.errors()[0].field, GzipConfig::FIELDS.prefix);
    }
}
