//! Host selection: which base url serves an asset.
//!
//! Pure function of the source, the request and the config; no I/O.
//!
//! ```text
//! not remote / cdn off  → fallback host          http://www.example.com
//! resolver              → resolver(source, req)  (scheme supplied by it)
//! %d template           → shard by source hash   http://assets-2.example.com
//! literal cname         → as is                  http://assets.example.com
//! no cname              → bucket host            http://bucket.s3.amazonaws.com
//!
//! then at most one suffix:  /ssl_prefix  >  /gz  >  /plain_prefix
//! ```

use std::sync::Arc;

use crate::config::section::cdn::SHARD_PLACEHOLDER;
use crate::config::{CdnHost, Config};
use crate::debug;
use crate::request::RequestContext;
use crate::utils::hash;
use crate::utils::path::route::extension_of;

#[derive(Debug, Clone)]
pub struct HostSelector {
    config: Arc<Config>,
    host: Option<CdnHost>,
}

impl HostSelector {
    pub fn new(config: Arc<Config>) -> Self {
        let host = config.cdn.host();
        Self { config, host }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Base url for `source`.
    ///
    /// `is_remote` says whether this asset may be served from the CDN at
    /// all (uploaded and not excluded); `force_ssl` picks https regardless
    /// of the request.
    pub fn asset_host(
        &self,
        source: &str,
        request: Option<&RequestContext>,
        is_remote: bool,
        force_ssl: bool,
    ) -> String {
        let ssl = force_ssl || request.is_some_and(|r| r.ssl);

        if !is_remote || !self.config.cdn.enable {
            return self.fallback_host(ssl);
        }

        let scheme = scheme(ssl);
        let mut host = match &self.host {
            Some(CdnHost::Resolver(resolver)) => resolver.resolve(source, request),
            Some(CdnHost::ShardedTemplate(template)) => {
                let shard = hash::bucket(source, self.config.cdn.shards);
                format!(
                    "{scheme}://{}",
                    template.replace(SHARD_PLACEHOLDER, &shard.to_string())
                )
            }
            Some(CdnHost::Literal(cname)) => format!("{scheme}://{cname}"),
            None => match self.config.storage.bucket_host() {
                Some(bucket_host) => format!("{scheme}://{bucket_host}"),
                None => {
                    debug!("host"; "no cname or bucket configured, serving {} locally", source);
                    return self.fallback_host(ssl);
                }
            },
        };

        if let Some(suffix) = self.suffix(source, request, ssl) {
            host.push('/');
            host.push_str(suffix);
        }
        host
    }

    /// Fallback host with scheme, or empty when none is configured.
    pub fn fallback_host(&self, ssl: bool) -> String {
        self.config
            .assets
            .fallback_host()
            .map(|host| format!("{}://{host}", scheme(ssl)))
            .unwrap_or_default()
    }

    /// Path segment after the host. The three kinds never combine.
    fn suffix(&self, source: &str, request: Option<&RequestContext>, ssl: bool) -> Option<&str> {
        let cdn = &self.config.cdn;
        let gzip = &self.config.gzip;

        let ssl_prefix = cdn.ssl_prefix.trim_matches('/');
        let is_stylesheet = extension_of(source).is_some_and(|ext| ext == "css");
        if is_stylesheet && ssl && !ssl_prefix.is_empty() {
            return Some(ssl_prefix);
        }

        if let Some(gz) = gzip.suffix()
            && request.is_some_and(RequestContext::accepts_gzip)
            && gzip.allows(source)
        {
            return Some(gz.trim_matches('/'));
        }

        let plain_prefix = cdn.plain_prefix.trim_matches('/');
        (!plain_prefix.is_empty()).then_some(plain_prefix)
    }
}

#[inline]
const fn scheme(ssl: bool) -> &'static str {
    if ssl { "https" } else { "http" }
}
