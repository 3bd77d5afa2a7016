//! `cdnhost css`: rewrite stylesheets.

use std::path::Path;

use anyhow::{Result, bail};
use cdnhost::css::RewriteStats;
use cdnhost::{StylesheetRewriter, log};

use super::{Cli, CssArgs, common};

pub fn rewrite_css(cli: &Cli, args: &CssArgs) -> Result<()> {
    let host = common::build_host(cli, args.manifest.as_deref())?;
    let rewriter = StylesheetRewriter::new(&host);

    let path = match &args.path {
        Some(path) => std::path::absolute(path)?,
        None => host.config().assets.stylesheets_dir(),
    };

    if path.is_file() {
        return rewrite_one(&rewriter, &path, args);
    }
    if !path.is_dir() {
        bail!("no such stylesheet or directory: {}", path.display());
    }
    let Some(out) = &args.out else {
        bail!("--out is required when rewriting a directory");
    };
    rewrite_dir(&rewriter, &path, out, args.ssl)
}

fn rewrite_one(rewriter: &StylesheetRewriter<'_>, path: &Path, args: &CssArgs) -> Result<()> {
    let rewritten = rewriter.rewrite_stylesheet(path, args.ssl)?;
    match &args.out {
        Some(out) => {
            let name = path.file_name().unwrap_or_default();
            rewritten.copy_to(&out.join(name))?;
            log!("css"; "{} ({})", path.display(), rewritten.stats);
        }
        None => print!("{}", rewritten.contents()?),
    }
    Ok(())
}

fn rewrite_dir(rewriter: &StylesheetRewriter<'_>, dir: &Path, out: &Path, ssl: bool) -> Result<()> {
    let mut stats = RewriteStats::default();
    let mut written = 0;
    let mut failed = 0;

    for (path, result) in rewriter.rewrite_all(dir, ssl) {
        let rel = path.strip_prefix(dir).unwrap_or(&path);
        match result.and_then(|rewritten| {
            rewritten.copy_to(&out.join(rel))?;
            Ok(rewritten.stats)
        }) {
            Ok(s) => {
                stats.merge(s);
                written += 1;
            }
            Err(e) => {
                log!("error"; "{}: {}", path.display(), e);
                failed += 1;
            }
        }
    }

    log!("css"; "{} stylesheets written to {} ({})", written, out.display(), stats);
    if failed > 0 {
        bail!("{failed} stylesheets failed");
    }
    Ok(())
}
