//! Config and host setup shared by the subcommands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use cdnhost::config::{Config, ConfigError, Overrides};
use cdnhost::{AssetHost, KeyCache};

use super::Cli;

/// Load the config with command-line overrides applied.
pub fn load_config(cli: &Cli, manifest: Option<&Path>) -> Result<Config> {
    let overrides = Overrides {
        enable: cli.enable,
        cname: cli.cname.clone(),
        root: cli.root.as_deref().map(absolute).transpose()?,
        manifest: manifest.map(absolute).transpose()?,
    };
    Ok(Config::load(&cli.config, &overrides)?)
}

/// Like [`load_config`], but a missing config file yields the defaults.
pub fn load_config_or_default(cli: &Cli) -> Result<Config> {
    match load_config(cli, None) {
        Ok(config) => Ok(config),
        Err(e) if matches!(e.downcast_ref::<ConfigError>(), Some(ConfigError::NotFound(_))) => {
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}

/// Asset host over the loaded config, with a key cache attached.
pub fn build_host(cli: &Cli, manifest: Option<&Path>) -> Result<AssetHost> {
    let config = load_config(cli, manifest)?;
    let host = AssetHost::from_config(Arc::new(config))
        .context("failed to set up asset host")?
        .with_key_cache(Arc::new(KeyCache::new()));
    Ok(host)
}

/// Command-line paths are relative to the current directory, not the config.
fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("invalid path: {}", path.display()))
}
