//! cdnhost - content-addressed CDN urls for static assets.

mod cli;

use anyhow::Result;
use cdnhost::logger;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    match &cli.command {
        Commands::Key { files, prefix } => cli::key::print_keys(&cli, files, prefix.as_deref()),
        Commands::Url { args } => cli::url::print_url(&cli, args),
        Commands::Css { args } => cli::css::rewrite_css(&cli, args),
    }
}
