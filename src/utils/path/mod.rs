//! Path and URL utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem paths (`normalize_path`, `clean_path`, `url_path_under`)
//! - [`route`]: URL-token helpers (`is_external_link`, `extension_of`)

pub mod fs;
pub mod route;

pub use fs::{clean_path, normalize_path, url_path_under};
