//! `cdnhost key`: print content keys.

use std::path::PathBuf;

use anyhow::{Context, Result};
use cdnhost::key_for_path;

use super::{Cli, common};

pub fn print_keys(cli: &Cli, files: &[PathBuf], prefix: Option<&str>) -> Result<()> {
    let config_prefix;
    let prefix = match prefix {
        Some(prefix) => prefix,
        None => {
            config_prefix = common::load_config_or_default(cli)?.storage.key_prefix;
            config_prefix.as_str()
        }
    };

    for file in files {
        let key = key_for_path(file, prefix)
            .with_context(|| format!("failed to digest {}", file.display()))?;
        println!("{key}  {}", file.display());
    }
    Ok(())
}
