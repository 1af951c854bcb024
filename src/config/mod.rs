//! Configuration management for tmplpack.
//!
//! A bundle is described by a `tmplpack.toml` file:
//!
//! ```toml
//! source = "views"
//! public = "public"
//! prefix = "/templates"
//! global = "Templates"
//! reload = false
//! extension = "tmpl"
//! serve_on_write_failure = false
//!
//! [compile]
//! autoescape = true
//! debug = false
//! ```
//!
//! # Resolution Order
//!
//! 1. `--config <path>` or the `TMPLPACK_CONFIG` environment variable
//! 2. `tmplpack.toml` in the current directory
//! 3. No file: `--source` and `--prefix` must be given on the command line
//!
//! Command-line overrides (`--source`, `--public`, `--prefix`, `--global`,
//! `--reload`) are applied over the file. Relative paths in a file are
//! resolved against the file's directory. The result is normalized and
//! validated with [`BundleConfig::normalize`].

mod bundle;
mod parser;

pub use bundle::{BundleConfig, ConfigOverrides};
pub use parser::parse_config;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::constants::CONFIG_FILE_NAME;

/// Finds the configuration file to use, if any.
///
/// An explicit path must exist; the default file is optional.
pub fn locate_config(explicit: Option<&Path>, cwd: &Path) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }

    let default = cwd.join(CONFIG_FILE_NAME);
    Ok(default.is_file().then_some(default))
}

/// Loads, merges and validates the bundle configuration.
pub fn load_config(explicit: Option<&Path>, overrides: ConfigOverrides) -> Result<BundleConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    load_config_from(explicit, &cwd, overrides)
}

/// [`load_config`] with an explicit working directory.
pub fn load_config_from(
    explicit: Option<&Path>,
    cwd: &Path,
    overrides: ConfigOverrides,
) -> Result<BundleConfig> {
    let config = match locate_config(explicit, cwd)? {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path.display());
            let base = path.parent().map_or_else(|| cwd.to_path_buf(), Path::to_path_buf);
            parse_config::<BundleConfig>(&path)?.relative_to(&base).with_overrides(overrides)
        }
        None => BundleConfig::from_overrides(overrides)?.relative_to(cwd),
    };

    Ok(config.normalize()?)
}
