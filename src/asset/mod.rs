//! Asset keys, host selection and reference rewriting.
//!
//! ```text
//! key       content → md5 key (9 hex chars, optional prefix)
//! cache     path + mtime → key
//! index     which files are on the CDN
//! exclude   which sources must stay local
//! host      source + request → base url
//! rewrite   source → final reference
//! ```

mod cache;
mod exclude;
mod host;
mod index;
mod key;
mod rewrite;

pub use cache::KeyCache;
pub use exclude::{CdnExclusion, GlobExclusion, NoExclusion};
pub use host::HostSelector;
pub use index::{RemoteAssetIndex, RemotePaths};
pub use key::{KEY_LEN, key_for_bytes, key_for_path};
pub use rewrite::{AssetHost, AssetId, FallbackAssetPath, PlainPath, RewriteResult};
