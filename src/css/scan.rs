//! Stylesheet discovery and batch rewriting.

use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use rayon::prelude::*;

use super::{RewrittenStylesheet, StylesheetRewriter};
use crate::error::Result;
use crate::logger::ProgressLine;

/// All `*.css` files below `dir`, sorted.
pub fn stylesheets_to_rewrite(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("css"))
        })
        .collect();
    files.sort();
    files
}

impl StylesheetRewriter<'_> {
    /// Rewrite every stylesheet below `dir` in parallel.
    ///
    /// Results keep the order of [`stylesheets_to_rewrite`]; one failing
    /// stylesheet does not stop the others.
    pub fn rewrite_all(
        &self,
        dir: &Path,
        force_ssl: bool,
    ) -> Vec<(PathBuf, Result<RewrittenStylesheet>)> {
        let files = stylesheets_to_rewrite(dir);
        let progress = ProgressLine::new(&[("css", files.len())]);

        let results = files
            .into_par_iter()
            .map(|path| {
                let result = self.rewrite_stylesheet(&path, force_ssl);
                progress.inc("css");
                (path, result)
            })
            .collect();

        progress.finish();
        results
    }
}
