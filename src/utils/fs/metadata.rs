//! Modification time pinning.
//!
//! Freshness in tmplpack is purely mtime based: source files stamp their units,
//! artifact files stamp their last generation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Sets the modification time of an existing file.
///
/// Tests and fixtures pin timestamps with this instead of sleeping between
/// writes, which keeps them independent of filesystem mtime granularity.
pub fn set_modified_time(path: &Path, time: SystemTime) -> Result<()> {
    let file = fs::File::options()
        .write(true)
        .open(path)
        .with_context(|| format!("Failed to open for timestamp update: {}", path.display()))?;
    file.set_modified(time)
        .with_context(|| format!("Failed to set modification time for: {}", path.display()))
}
