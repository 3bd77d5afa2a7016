//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Content-addressed CDN urls for static assets
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: cdnhost.toml, searched upward)
    #[arg(short = 'C', long, global = true, default_value = "cdnhost.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Print debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Override `cdn.enable`
    #[arg(long, global = true, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub enable: Option<bool>,

    /// Override `cdn.cname` (literal host or `%d` template)
    #[arg(long, global = true)]
    pub cname: Option<String>,

    /// Override `assets.root` (relative to current directory)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the content key of each file
    #[command(visible_alias = "k")]
    Key {
        /// Files to digest
        #[arg(required = true, value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
        files: Vec<PathBuf>,

        /// Key prefix (default: `storage.key_prefix`, if a config is found)
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// Print the rewritten reference for an asset
    #[command(visible_alias = "u")]
    Url {
        #[command(flatten)]
        args: UrlArgs,
    },

    /// Rewrite url(...) references in stylesheets
    #[command(visible_alias = "c")]
    Css {
        #[command(flatten)]
        args: CssArgs,
    },
}

/// Url command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct UrlArgs {
    /// Root-relative asset path, e.g. /images/logo.png
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Pretend the request came over https
    #[arg(short, long)]
    pub ssl: bool,

    /// Pretend the request accepts gzip
    #[arg(short, long)]
    pub gzip: bool,

    /// User-Agent of the pretend request
    #[arg(short = 'A', long)]
    pub user_agent: Option<String>,

    /// JSON list of uploaded paths (overrides `assets.manifest`)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub manifest: Option<PathBuf>,
}

/// Css command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct CssArgs {
    /// Stylesheet or directory (default: `assets.stylesheets`)
    #[arg(value_name = "PATH", value_hint = clap::ValueHint::AnyPath)]
    pub path: Option<PathBuf>,

    /// Use https for every rewritten url
    #[arg(short, long)]
    pub ssl: bool,

    /// Output directory; a single stylesheet without it goes to stdout
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub out: Option<PathBuf>,

    /// JSON list of uploaded paths (overrides `assets.manifest`)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub manifest: Option<PathBuf>,
}
