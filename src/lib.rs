//! cdnhost - content-addressed CDN urls for static assets.
//!
//! Rewrites asset references (`/images/logo.png`, `url(../images/bg.png)`)
//! so they point at a CDN-fronted storage bucket, using a short content
//! digest instead of a modification timestamp as the cache-busting key.
//!
//! # Module Structure
//!
//! ```text
//! src/
//! ├── asset/      # key derivation, host selection, single-reference rewrite
//! ├── css/        # url(...) rewriting inside stylesheets
//! ├── config/     # cdnhost.toml loading and validation
//! ├── request     # per-request context (ssl, gzip)
//! ├── logger      # log!/debug! macros, progress line
//! └── utils/      # hashing and lexical path helpers
//! ```

pub mod logger;

pub mod asset;
pub mod config;
pub mod css;
pub mod error;
pub mod request;
pub mod utils;

pub use asset::{
    AssetHost, AssetId, CdnExclusion, FallbackAssetPath, GlobExclusion, HostSelector, KeyCache,
    NoExclusion, PlainPath, RemoteAssetIndex, RemotePaths, RewriteResult, key_for_bytes,
    key_for_path,
};
pub use config::{CdnHost, Config};
pub use css::{RewrittenStylesheet, StylesheetRewriter};
pub use error::{Error, Result};
pub use request::RequestContext;
