//! Single asset reference rewriting.
//!
//! [`AssetHost`] ties together the config, the remote index, the exclusion
//! rules and the key cache. Template glue calls [`AssetHost::rewrite`] once
//! per asset reference; framework glue that splits "asset id" from "asset
//! path" uses [`AssetHost::asset_id`] and [`AssetHost::asset_path`], with
//! its stock behavior plugged in as a [`FallbackAssetPath`].

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use super::{
    CdnExclusion, GlobExclusion, HostSelector, KeyCache, RemoteAssetIndex, RemotePaths,
    key_for_path,
};
use crate::config::{Config, ConfigError};
use crate::debug;
use crate::error::{Error, Result};
use crate::request::RequestContext;
use crate::utils::path::url_path_under;

// ============================================================================
// Results
// ============================================================================

/// Outcome of rewriting one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteResult {
    /// Served locally, reference returned as given.
    Unchanged(String),
    /// Served locally with a `?<mtime>` cache buster.
    Timestamped(String),
    /// Full CDN url.
    Rewritten(String),
}

impl RewriteResult {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unchanged(s) | Self::Timestamped(s) | Self::Rewritten(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Unchanged(s) | Self::Timestamped(s) | Self::Rewritten(s) => s,
        }
    }

    pub fn is_rewritten(&self) -> bool {
        matches!(self, Self::Rewritten(_))
    }
}

impl fmt::Display for RewriteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The cache-busting part of an asset path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetId {
    /// Content key, the asset is on the CDN.
    Key(String),
    /// Modification time in epoch seconds, the asset is local.
    Timestamp(u64),
    /// Nothing to add.
    None,
}

// ============================================================================
// Fallback strategy
// ============================================================================

/// Path for assets this crate leaves alone.
///
/// Frameworks plug their stock asset-path logic in here instead of having
/// it aliased away.
pub trait FallbackAssetPath: Send + Sync {
    fn asset_path(&self, source: &str) -> String;
}

/// Returns the source untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPath;

impl FallbackAssetPath for PlainPath {
    fn asset_path(&self, source: &str) -> String {
        source.to_string()
    }
}

impl<F> FallbackAssetPath for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn asset_path(&self, source: &str) -> String {
        self(source)
    }
}

// ============================================================================
// AssetHost
// ============================================================================

pub struct AssetHost {
    host: HostSelector,
    index: Arc<dyn RemoteAssetIndex>,
    exclusion: Arc<dyn CdnExclusion>,
    keys: Option<Arc<KeyCache>>,
    fallback: Arc<dyn FallbackAssetPath>,
}

impl fmt::Debug for AssetHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetHost")
            .field("host", &self.host)
            .field("cached_keys", &self.keys.as_ref().map(|k| k.len()))
            .finish_non_exhaustive()
    }
}

impl AssetHost {
    /// Build from a validated config and a remote index.
    ///
    /// Exclusion patterns come from `assets.exclude`.
    pub fn new(config: Arc<Config>, index: impl RemoteAssetIndex + 'static) -> Result<Self> {
        let exclusion = GlobExclusion::new(config.root(), &config.assets.exclude)
            .map_err(|e| ConfigError::Validation(format!("invalid exclude pattern: {e}")))?;

        Ok(Self {
            host: HostSelector::new(config),
            index: Arc::new(index),
            exclusion: Arc::new(exclusion),
            keys: None,
            fallback: Arc::new(PlainPath),
        })
    }

    /// Build with the index read from `assets.manifest` (empty if unset).
    pub fn from_config(config: Arc<Config>) -> Result<Self> {
        let index = match &config.assets.manifest {
            Some(manifest) => RemotePaths::load_manifest(manifest, config.root())?,
            None => RemotePaths::new(),
        };
        debug!("index"; "{} remote assets", index.len());
        Self::new(config, index)
    }

    pub fn with_exclusion(mut self, exclusion: impl CdnExclusion + 'static) -> Self {
        self.exclusion = Arc::new(exclusion);
        self
    }

    pub fn with_key_cache(mut self, keys: Arc<KeyCache>) -> Self {
        self.keys = Some(keys);
        self
    }

    pub fn with_fallback(mut self, fallback: impl FallbackAssetPath + 'static) -> Self {
        self.fallback = Arc::new(fallback);
        self
    }

    pub fn config(&self) -> &Config {
        self.host.config()
    }

    pub fn selector(&self) -> &HostSelector {
        &self.host
    }

    /// See [`HostSelector::asset_host`].
    #[inline]
    pub fn asset_host(
        &self,
        source: &str,
        request: Option<&RequestContext>,
        is_remote: bool,
        force_ssl: bool,
    ) -> String {
        self.host.asset_host(source, request, is_remote, force_ssl)
    }

    /// Host for a path as it appears in rendered output.
    ///
    /// Fingerprinted paths (`/8ed41cb87/javascripts/app.js`) don't exist
    /// under the asset root and go to the CDN; plain paths that do exist
    /// are served by the fallback host.
    ///
    /// Shards are picked from the path below the fingerprint, so the host
    /// matches the one [`AssetHost::rewrite`] chose for the same asset.
    pub fn for_rendered_path(&self, source: &str, request: Option<&RequestContext>) -> String {
        let is_remote = !self.config().root_join(source).exists();
        self.asset_host(&self.unfingerprinted(source), request, is_remote, false)
    }

    /// `/8ed41cb87/images/a.png` → `/images/a.png`: the path from the first
    /// asset dir on. Sources without one are returned rooted as they are.
    fn unfingerprinted<'s>(&self, source: &'s str) -> Cow<'s, str> {
        let assets = &self.config().assets;
        let mut rest = source;
        loop {
            if assets.is_asset_source(rest) {
                return rooted(rest);
            }
            let trimmed = rest.trim_start_matches('/');
            match trimmed.find('/') {
                Some(idx) => rest = &trimmed[idx..],
                None => return rooted(source),
            }
        }
    }

    /// Absolute local path of a root-relative source.
    pub fn resolve(&self, source: &str) -> PathBuf {
        self.config().root_join(source)
    }

    /// Canonical url path (`/images/a.png`) of `source`, if it resolves to a
    /// file inside one of the asset dirs. `..` never escapes the root.
    pub fn asset_url_path(&self, source: &str) -> Option<String> {
        self.locate(source).map(|(_, url)| url)
    }

    fn locate(&self, source: &str) -> Option<(PathBuf, String)> {
        let config = self.config();
        let path = self.resolve(source);
        let url = url_path_under(&path, config.root())?;
        config.assets.is_asset_source(&url).then_some((path, url))
    }

    /// Url path a content key is prepended to; also what shards are hashed on.
    fn key_url_path<'s>(&self, source: &'s str) -> Cow<'s, str> {
        match self.asset_url_path(source) {
            Some(url) => Cow::Owned(url),
            None => rooted(source),
        }
    }

    /// Whether the file at `path` (referenced as `source`) goes to the CDN.
    pub fn is_remote(&self, path: &Path, source: &str) -> bool {
        self.config().cdn.enable
            && self.index.contains(path)
            && !self.exclusion.is_excluded(source)
    }

    /// Content key for `path`, through the cache when one is attached.
    pub fn key_for(&self, path: &Path) -> Result<String> {
        let prefix = &self.config().storage.key_prefix;
        match &self.keys {
            Some(keys) => keys.key_for(path, prefix),
            None => key_for_path(path, prefix),
        }
    }

    /// Cache-busting id for `source`: at most one stat and one read.
    pub fn asset_id(&self, source: &str) -> Result<AssetId> {
        let Some((path, url)) = self.locate(source) else {
            debug!("asset"; "{} is outside the asset dirs, left as is", source);
            return Ok(AssetId::None);
        };

        let Ok(mtime) = fs::metadata(&path).and_then(|m| m.modified()) else {
            debug!("asset"; "{} not found, left as is", source);
            return Ok(AssetId::None);
        };

        if self.is_remote(&path, &url) {
            let prefix = &self.config().storage.key_prefix;
            let key = match &self.keys {
                Some(keys) => keys.key_for_mtime(&path, mtime, prefix),
                None => key_for_path(&path, prefix),
            };
            return match key {
                Ok(key) if key.is_empty() => Ok(AssetId::None),
                Ok(key) => Ok(AssetId::Key(key)),
                Err(Error::NotFound(_)) => Ok(AssetId::None),
                Err(e) => Err(e),
            };
        }

        if self.config().assets.timestamp_fallback {
            return Ok(AssetId::Timestamp(epoch_secs(mtime)));
        }
        Ok(AssetId::None)
    }

    /// Host-less asset path: `/<key><source>`, `<source>?<mtime>`, or the
    /// fallback strategy's path.
    pub fn asset_path(&self, source: &str) -> Result<String> {
        Ok(match self.asset_id(source)? {
            AssetId::Key(key) => format!("/{key}{}", self.key_url_path(source)),
            AssetId::Timestamp(secs) => format!("{source}?{secs}"),
            AssetId::None => self.fallback.asset_path(source),
        })
    }

    /// Final reference for `source`.
    ///
    /// ```text
    /// /images/logo.png  →  http://assets.example.com/8ed41cb87/images/logo.png
    /// ```
    pub fn rewrite(
        &self,
        source: &str,
        request: Option<&RequestContext>,
        force_ssl: bool,
    ) -> Result<RewriteResult> {
        Ok(match self.asset_id(source)? {
            AssetId::Key(key) => {
                let url = self.key_url_path(source);
                let host = self.asset_host(&url, request, true, force_ssl);
                RewriteResult::Rewritten(format!("{host}/{key}{url}"))
            }
            AssetId::Timestamp(secs) => RewriteResult::Timestamped(format!("{source}?{secs}")),
            AssetId::None => RewriteResult::Unchanged(self.fallback.asset_path(source)),
        })
    }
}

/// `source` with a leading slash.
fn rooted(source: &str) -> Cow<'_, str> {
    if source.starts_with('/') {
        source.into()
    } else {
        format!("/{source}").into()
    }
}

fn epoch_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
