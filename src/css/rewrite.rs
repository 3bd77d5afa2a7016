//! `url(...)` rewriting inside one stylesheet.
//!
//! ```text
//! url(../images/bg.png#frag?v=1)
//!   uploaded  →  url(http://assets.example.com/d41d8cd98/images/bg.png#frag?v=1)
//!   local     →  url(http://www.example.com/images/bg.png#frag?v=1)
//!   missing   →  unchanged, reported
//! ```
//!
//! Matching is a single regex pass: escaped parentheses or nested
//! parentheses inside the url token are not understood.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tempfile::NamedTempFile;

use crate::asset::AssetHost;
use crate::error::{Error, Result};
use crate::utils::path::route::is_external_link;
use crate::utils::path::{clean_path, url_path_under};
use crate::{debug, log};

/// `url(` + optional quote + path + optional `#fragment` + optional `?query`.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)url\(["']?([^)?#"']+)(#[^"')]*)?(\?[^"')]*)?["']?\)"#).unwrap()
});

/// Per-stylesheet counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// Pointed at the CDN.
    pub rewritten: usize,
    /// Pointed at the fallback host.
    pub fallback: usize,
    /// Left as written (missing, external, outside the root).
    pub skipped: usize,
}

impl RewriteStats {
    pub fn total(&self) -> usize {
        self.rewritten + self.fallback + self.skipped
    }

    pub fn merge(&mut self, other: Self) {
        self.rewritten += other.rewritten;
        self.fallback += other.fallback;
        self.skipped += other.skipped;
    }
}

impl fmt::Display for RewriteStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rewritten, {} fallback, {} skipped",
            self.rewritten, self.fallback, self.skipped
        )
    }
}

/// A rewritten stylesheet in a temporary file.
///
/// The file is removed when this value is dropped; copy or persist it first.
#[derive(Debug)]
pub struct RewrittenStylesheet {
    pub file: NamedTempFile,
    pub stats: RewriteStats,
}

impl RewrittenStylesheet {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Read the rewritten text back.
    pub fn contents(&self) -> Result<String> {
        fs::read_to_string(self.path()).map_err(|e| Error::io(self.path(), e))
    }

    /// Copy the rewritten text to `dest`, creating parent directories.
    pub fn copy_to(&self, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::copy(self.path(), dest).map_err(|e| Error::io(dest, e))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StylesheetRewriter<'a> {
    host: &'a AssetHost,
}

impl<'a> StylesheetRewriter<'a> {
    pub fn new(host: &'a AssetHost) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &'a AssetHost {
        self.host
    }

    /// Rewrite the stylesheet at `path` into a flushed temporary file.
    pub fn rewrite_stylesheet(&self, path: &Path, force_ssl: bool) -> Result<RewrittenStylesheet> {
        let css = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let (text, stats) = self.rewrite_stylesheet_str(&css, path, force_ssl)?;

        let mut file = tempfile::Builder::new()
            .prefix("cdnhost-css")
            .suffix(".css")
            .tempfile()
            .map_err(|e| Error::io(std::env::temp_dir(), e))?;
        if let Err(e) = file.write_all(text.as_bytes()) {
            return Err(Error::io(file.path(), e));
        }
        if let Err(e) = file.flush() {
            return Err(Error::io(file.path(), e));
        }

        debug!("css"; "{}: {}", path.display(), stats);
        Ok(RewrittenStylesheet { file, stats })
    }

    /// Rewrite stylesheet text; `path` is where the text lives, used to
    /// resolve relative references.
    ///
    /// Text outside `url(...)` tokens is copied byte for byte.
    pub fn rewrite_stylesheet_str(
        &self,
        css: &str,
        path: &Path,
        force_ssl: bool,
    ) -> Result<(String, RewriteStats)> {
        let dir = path.parent().unwrap_or(Path::new(""));
        let mut stats = RewriteStats::default();
        let mut first_error = None;

        let text = URL_RE.replace_all(css, |caps: &Captures| {
            let token = UrlToken::from_captures(caps);
            match self.rewrite_token(&token, dir, path, force_ssl) {
                Ok(Outcome::Cdn(url)) => {
                    stats.rewritten += 1;
                    url
                }
                Ok(Outcome::Fallback(url)) => {
                    stats.fallback += 1;
                    url
                }
                Ok(Outcome::Skip) => {
                    stats.skipped += 1;
                    caps[0].to_string()
                }
                Err(e) => {
                    stats.skipped += 1;
                    first_error.get_or_insert(e);
                    caps[0].to_string()
                }
            }
        });

        match first_error {
            Some(e) => Err(e),
            None => Ok((text.into_owned(), stats)),
        }
    }

    fn rewrite_token(
        &self,
        token: &UrlToken<'_>,
        dir: &Path,
        stylesheet: &Path,
        force_ssl: bool,
    ) -> Result<Outcome> {
        let target = token.target;
        if target.is_empty() || is_external_link(target) || target.starts_with("data:") {
            return Ok(Outcome::Skip);
        }

        let config = self.host.config();
        let path = resolve(target, dir, config.root());
        let Some(relative) = url_path_under(&path, config.root()) else {
            log!("css"; "{}: url({}) is outside the asset root", stylesheet.display(), target);
            return Ok(Outcome::Skip);
        };

        if !self.host.is_remote(&path, &relative) {
            let host = self.host.selector().fallback_host(force_ssl);
            return Ok(Outcome::Fallback(token.render(&host, "", &relative)));
        }

        if !path.is_file() {
            log!("css"; "{}: url({}) not found", stylesheet.display(), target);
            return Ok(Outcome::Skip);
        }

        let key = match self.host.key_for(&path) {
            Ok(key) => key,
            Err(Error::NotFound(_)) => {
                log!("css"; "{}: url({}) not found", stylesheet.display(), target);
                return Ok(Outcome::Skip);
            }
            Err(e) => return Err(e),
        };
        let host = self.host.asset_host(&relative, None, true, force_ssl);
        Ok(Outcome::Cdn(token.render(&host, &key, &relative)))
    }
}

enum Outcome {
    Cdn(String),
    Fallback(String),
    Skip,
}

/// Pieces of one `url(...)` match.
struct UrlToken<'t> {
    target: &'t str,
    fragment: &'t str,
    query: &'t str,
}

impl<'t> UrlToken<'t> {
    fn from_captures(caps: &Captures<'t>) -> Self {
        let part = |i| caps.get(i).map_or("", |m| m.as_str());
        Self {
            target: part(1).trim(),
            fragment: part(2),
            query: part(3),
        }
    }

    /// `url(<host>[/<key>]<relative><fragment><query>)`
    fn render(&self, host: &str, key: &str, relative: &str) -> String {
        let mut out = String::with_capacity(
            8 + host.len() + key.len() + relative.len() + self.fragment.len() + self.query.len(),
        );
        out.push_str("url(");
        out.push_str(host);
        if !key.is_empty() {
            out.push('/');
            out.push_str(key);
        }
        out.push_str(relative);
        out.push_str(self.fragment);
        out.push_str(self.query);
        out.push(')');
        out
    }
}

/// Local file a url token refers to.
///
/// Root-relative tokens resolve against the asset root, others against the
/// stylesheet's directory.
fn resolve(target: &str, dir: &Path, root: &Path) -> PathBuf {
    match target.strip_prefix('/') {
        Some(rooted) => clean_path(&root.join(rooted)),
        None => clean_path(&dir.join(target)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{KeyCache, RemotePaths};
    use crate::config::{Config, test_parse_config};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Site {
        _dir: TempDir,
        root: PathBuf,
    }

    impl Site {
        fn stylesheet(&self) -> PathBuf {
            self.root.join("stylesheets/style.css")
        }
    }

    /// public/{images/image.png, images/local.png, stylesheets/style.css}
    fn site() -> Site {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap().join("public");
        fs::create_dir_all(root.join("images")).unwrap();
        fs::create_dir_all(root.join("stylesheets")).unwrap();
        fs::write(root.join("images/image.png"), "").unwrap();
        fs::write(root.join("images/local.png"), "local").unwrap();
        Site { _dir: dir, root }
    }

    fn config(site: &Site, extra: &str) -> Arc<Config> {
        let base = site.root.parent().unwrap();
        let config = test_parse_config(&format!(
            "[cdn]\nenable = true\ncname = \"assethost.com\"\n{extra}\n\
             [storage]\nbucket = \"bucketname\"\n\
             [assets]\nfallback_host = \"www.example.com\""
        ))
        .finalize(base)
        .unwrap();
        Arc::new(config)
    }

    fn host(site: &Site, extra: &str) -> AssetHost {
        let index: RemotePaths = [site.root.join("images/image.png")].into_iter().collect();
        AssetHost::new(config(site, extra), index).unwrap()
    }

    fn rewrite(host: &AssetHost, site: &Site, css: &str) -> (String, RewriteStats) {
        StylesheetRewriter::new(host)
            .rewrite_stylesheet_str(css, &site.stylesheet(), false)
            .unwrap()
    }

    #[test]
    fn test_remote_url_is_rewritten() {
        let site = site();
        let host = host(&site, "");
        let (css, stats) = rewrite(&host, &site, "body { background: url(../images/image.png); }");
        assert_eq!(
            css,
            "body { background: url(http://assethost.com/d41d8cd98/images/image.png); }"
        );
        assert_eq!(stats.rewritten, 1);
    }

    #[test]
    fn test_quotes_and_root_relative() {
        let site = site();
        let host = host(&site, "");
        for input in [
            "url('/images/image.png')",
            "url(\"/images/image.png\")",
            "URL(../images/../images/image.png)",
        ] {
            let (css, _) = rewrite(&host, &site, input);
            assert_eq!(css, "url(http://assethost.com/d41d8cd98/images/image.png)", "{input}");
        }
    }

    #[test]
    fn test_fragment_is_preserved() {
        let site = site();
        let host = host(&site, "");
        let (css, _) = rewrite(&host, &site, "a { background: url(../images/image.png#223145) }");
        assert_eq!(
            css,
            "a { background: url(http://assethost.com/d41d8cd98/images/image.png#223145) }"
        );
    }

    #[test]
    fn test_query_is_preserved() {
        let site = site();
        let host = host(&site, "");
        let (css, _) = rewrite(&host, &site, "url(../images/image.png?v=2)");
        assert_eq!(css, "url(http://assethost.com/d41d8cd98/images/image.png?v=2)");

        let (css, _) = rewrite(&host, &site, "url(../images/local.png?v=2)");
        assert_eq!(css, "url(http://www.example.com/images/local.png?v=2)");
    }

    #[test]
    fn test_local_asset_uses_fallback_host() {
        let site = site();
        let host = host(&site, "");
        let (css, stats) = rewrite(&host, &site, "url(../images/local.png)");
        assert_eq!(css, "url(http://www.example.com/images/local.png)");
        assert_eq!(stats.fallback, 1);
    }

    #[test]
    fn test_force_ssl() {
        let site = site();
        let host = host(&site, "");
        let rewriter = StylesheetRewriter::new(&host);
        let (css, _) = rewriter
            .rewrite_stylesheet_str(
                "url(../images/image.png) url(../images/local.png)",
                &site.stylesheet(),
                true,
            )
            .unwrap();
        assert_eq!(
            css,
            "url(https://assethost.com/d41d8cd98/images/image.png) \
             url(https://www.example.com/images/local.png)"
        );
    }

    #[test]
    fn test_missing_file_left_unchanged() {
        let site = site();
        let mut index = RemotePaths::new();
        index.insert(site.root.join("images/gone.png"));
        let host = AssetHost::new(config(&site, ""), index).unwrap();

        let (css, stats) = rewrite(&host, &site, "url(../images/gone.png)");
        assert_eq!(css, "url(../images/gone.png)");
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_unmatched_text_passes_through() {
        let site = site();
        let host = host(&site, "");
        let input = "/* ünïcode */\r\n.a{color:#223145}\n\turl-like: urlx;\n";
        let (css, stats) = rewrite(&host, &site, input);
        assert_eq!(css, input);
        assert_eq!(stats.total(), 0);
    }

    #[test]
    fn test_external_urls_skipped() {
        let site = site();
        let host = host(&site, "");
        let input = "url(http://cdn.other.com/a.png) url(//x.com/b.png) url(data:image/png;base64,AAAA)";
        let (css, stats) = rewrite(&host, &site, input);
        assert_eq!(css, input);
        assert_eq!(stats.skipped, 3);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let site = site();
        let host = host(&site, "");
        let input = "url(../images/image.png) url(../images/local.png#x)";
        let (once, _) = rewrite(&host, &site, input);
        let (twice, stats) = rewrite(&host, &site, &once);
        assert_eq!(once, twice);
        assert_eq!(stats.rewritten + stats.fallback, 0);
    }

    #[test]
    fn test_outside_root_skipped() {
        let site = site();
        let host = host(&site, "");
        let (css, stats) = rewrite(&host, &site, "url(../../secret.png)");
        assert_eq!(css, "url(../../secret.png)");
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_stylesheet_fixture_line_by_line() {
        let site = site();
        let host = host(&site, "");
        let input = "\
/* header, no urls here */
body { background-image: url(/images/image.png); }
body { background-image: url(../images/image.png); }
  .spacer { margin: 0 auto; }
body { background-image: url('/images/image.png'); }
body { background-image: url(\"../images/image.png\"); }

body { background-image: url(../images/../images/image.png); }
body { background-image: url(/images/./image.png); }
h1 { color: #223145; }
body { background-image: url(/images/image.png#223145); }
body { background-image: url(/strange_asset/image.png#223145); }
/* trailer */
";
        let (css, stats) = rewrite(&host, &site, input);
        let cdn = "body { background-image: url(http://assethost.com/d41d8cd98/images/image.png); }";
        let expected = [
            "/* header, no urls here */",
            cdn,
            cdn,
            "  .spacer { margin: 0 auto; }",
            cdn,
            cdn,
            "",
            cdn,
            cdn,
            "h1 { color: #223145; }",
            "body { background-image: url(http://assethost.com/d41d8cd98/images/image.png#223145); }",
            "body { background-image: url(http://www.example.com/strange_asset/image.png#223145); }",
            "/* trailer */",
        ];
        let lines: Vec<_> = css.split('\n').collect();
        assert_eq!(lines[..expected.len()], expected);
        assert_eq!(lines.len(), expected.len() + 1);
        assert!(css.ends_with("/* trailer */\n"));
        assert_eq!(stats.rewritten, 7);
        assert_eq!(stats.fallback, 1);
    }

    #[test]
    fn test_stylesheet_and_page_share_shard() {
        let site = site();
        let mut config = (*config(&site, "shards = 8")).clone();
        config.cdn.cname = Some("a-%d.com".into());
        let mut index = RemotePaths::new();
        let mut css = String::new();
        for i in 0..8 {
            let path = site.root.join(format!("images/i{i}.png"));
            fs::write(&path, format!("{i}")).unwrap();
            index.insert(&path);
            css.push_str(&format!("url(../images/i{i}.png)\n"));
        }
        let host = AssetHost::new(Arc::new(config), index).unwrap();

        let (css, _) = rewrite(&host, &site, &css);
        for (i, line) in css.lines().enumerate() {
            let page = host
                .rewrite(&format!("/images/i{i}.png"), None, false)
                .unwrap()
                .into_string();
            assert_eq!(line, format!("url({page})"));
        }
    }

    #[test]
    fn test_rewrite_stylesheet_writes_temp_file() {
        let site = site();
        let host = host(&site, "").with_key_cache(Arc::new(KeyCache::new()));
        fs::write(site.stylesheet(), "a { background: url(../images/image.png) }").unwrap();

        let result = StylesheetRewriter::new(&host)
            .rewrite_stylesheet(&site.stylesheet(), false)
            .unwrap();
        assert!(result.path().file_name().unwrap().to_string_lossy().starts_with("cdnhost-css"));
        assert_eq!(
            result.contents().unwrap(),
            "a { background: url(http://assethost.com/d41d8cd98/images/image.png) }"
        );
        assert_eq!(result.stats.rewritten, 1);

        let dest = site.root.join("out/style.css");
        result.copy_to(&dest).unwrap();
        assert_eq!(fs::read_to_string(dest).unwrap(), result.contents().unwrap());
    }

    #[test]
    fn test_rewrite_stylesheet_missing() {
        let site = site();
        let host = host(&site, "");
        let err = StylesheetRewriter::new(&host)
            .rewrite_stylesheet(&site.root.join("stylesheets/none.css"), false)
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
