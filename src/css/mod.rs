//! Stylesheet rewriting.
//!
//! Each `url(...)` reference in a stylesheet is pointed at the CDN (uploaded
//! assets) or the fallback host (local ones). Output goes to a temporary
//! file the caller copies wherever it belongs.

mod rewrite;
mod scan;

pub use rewrite::{RewriteStats, RewrittenStylesheet, StylesheetRewriter};
pub use scan::stylesheets_to_rewrite;
