//! Configuration section definitions.
//!
//! Each module corresponds to a section in `cdnhost.toml`:
//!
//! | Module    | TOML Section | Purpose                                   |
//! |-----------|--------------|-------------------------------------------|
//! | `assets`  | `[assets]`   | Asset root, dirs, fallback host, excludes |
//! | `cdn`     | `[cdn]`      | Enablement, cname, url prefixes           |
//! | `gzip`    | `[gzip]`     | Compressed-variant url suffix             |
//! | `storage` | `[storage]`  | Bucket, key prefix, credentials file      |

mod assets;
pub(crate) mod cdn;
mod gzip;
mod storage;

pub use assets::AssetsConfig;
pub use cdn::{CdnConfig, CdnHost, HostResolver};
pub use gzip::GzipConfig;
pub use storage::{StorageConfig, StorageCredentials};
