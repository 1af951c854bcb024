//! Generic TOML configuration parsing.
//!
//! Reads a file and deserializes it into any `DeserializeOwned` type, attaching
//! the file path to both read and parse failures.
//!
//! ```text
//! Failed to parse config file: /srv/app/tmplpack.toml
//! Caused by:
//!     missing field `prefix`
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML configuration file into the specified type.
///
/// # Examples
///
/// ```rust,no_run
/// use tmplpack::config::{parse_config, BundleConfig};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let config: BundleConfig = parse_config(Path::new("tmplpack.toml"))?;
/// println!("Serving {} under {}", config.source.display(), config.prefix);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or does not
/// match the shape of `T`. The underlying I/O or TOML error is kept as the cause.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
