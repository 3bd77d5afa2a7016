//! Command-line interface module.

mod args;
pub mod common;
pub mod css;
pub mod key;
pub mod url;

pub use args::{Cli, Commands, CssArgs, UrlArgs};
