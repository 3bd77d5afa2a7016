//! `[cdn]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [cdn]
//! enable = true
//! cname = "assets-%d.example.com"  # literal host, or %d shard template
//! shards = 4                       # %d is replaced by 0..shards
//! plain_prefix = ""                # appended as /<plain_prefix>
//! ssl_prefix = ""                  # https stylesheets: /<ssl_prefix>
//! ```
//!
//! A resolver function can replace `cname` entirely; it is set from code
//! with [`CdnConfig::with_resolver`] since it has no TOML form.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;
use crate::config_fields;
use crate::request::RequestContext;

/// Placeholder replaced by the shard index in a templated cname.
pub const SHARD_PLACEHOLDER: &str = "%d";

type ResolveFn = dyn Fn(&str, Option<&RequestContext>) -> String + Send + Sync;

/// User-supplied host function: `(source, request) -> "scheme://host"`.
#[derive(Clone)]
pub struct HostResolver(Arc<ResolveFn>);

impl HostResolver {
    pub fn new(f: impl Fn(&str, Option<&RequestContext>) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    #[inline]
    pub fn resolve(&self, source: &str, request: Option<&RequestContext>) -> String {
        (self.0)(source, request)
    }
}

impl fmt::Debug for HostResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HostResolver(..)")
    }
}

/// How the CDN host is produced for a request.
#[derive(Debug, Clone)]
pub enum CdnHost {
    /// Fixed host name, e.g. `assets.example.com`.
    Literal(String),
    /// Host name with a `%d` shard placeholder.
    ShardedTemplate(String),
    /// Function returning the full authority, scheme included.
    Resolver(HostResolver),
}

impl CdnHost {
    /// Classify a cname string. Empty means "no cname".
    pub fn parse(cname: &str) -> Option<Self> {
        let cname = cname.trim();
        if cname.is_empty() {
            None
        } else if cname.contains(SHARD_PLACEHOLDER) {
            Some(Self::ShardedTemplate(cname.to_string()))
        } else {
            Some(Self::Literal(cname.to_string()))
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CdnConfig {
    /// Serve remote assets from the CDN. When false every asset uses the
    /// fallback host.
    pub enable: bool,

    /// CDN host name or `%d` shard template. Falls back to the bucket host.
    pub cname: Option<String>,

    /// Number of shards a `%d` template expands to.
    pub shards: u32,

    /// Path segment appended to every CDN host (lowest priority suffix).
    pub plain_prefix: String,

    /// Path segment for stylesheets requested over https.
    pub ssl_prefix: String,

    /// Code-supplied host function, takes precedence over `cname`.
    #[serde(skip)]
    pub resolver: Option<HostResolver>,
}

config_fields!(CdnConfig => CdnFields, "cdn" {
    enable, cname, shards, plain_prefix, ssl_prefix,
});

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            enable: false,
            cname: None,
            shards: 4,
            plain_prefix: String::new(),
            ssl_prefix: String::new(),
            resolver: None,
        }
    }
}

impl CdnConfig {
    /// Install a host resolver function.
    pub fn with_resolver(
        mut self,
        f: impl Fn(&str, Option<&RequestContext>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.resolver = Some(HostResolver::new(f));
        self
    }

    /// The configured host variant, `None` when the bucket host should be used.
    pub fn host(&self) -> Option<CdnHost> {
        if let Some(resolver) = &self.resolver {
            return Some(CdnHost::Resolver(resolver.clone()));
        }
        self.cname.as_deref().and_then(CdnHost::parse)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let Some(cname) = self.cname.as_deref() else {
            return;
        };

        if cname.contains(SHARD_PLACEHOLDER) && self.shards == 0 {
            diag.error_with_hint(
                Self::FIELDS.shards,
                format!("{} must be at least 1 for a `%d` cname", Self::FIELDS.shards),
                "set `shards = 4` or drop the placeholder",
            );
        }

        if has_scheme(cname) {
            diag.error_with_hint(
                Self::FIELDS.cname,
                format!("{} must be a host name, got `{cname}`", Self::FIELDS.cname),
                "drop the scheme; http/https is chosen per request",
            );
        }
    }
}

/// `true` when `host` parses as a url with its own host part (`https://x.com`).
pub(crate) fn has_scheme(host: &str) -> bool {
    url::Url::parse(host).is_ok_and(|url| url.has_host())
}
