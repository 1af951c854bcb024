//! Atomic file write operations using temp-and-rename strategy.
//!
//! Artifacts are compared by modification time, so a reader must never observe
//! a half-written file: a partially written artifact with a fresh mtime would be
//! reused forever.

use crate::utils::fs::dirs::ensure_dir;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// 1. Creates the parent directory if needed
/// 2. Writes the content to a uniquely named temporary file in that directory
/// 3. Syncs the temporary file to disk
/// 4. Renames it over the target path
///
/// The temporary file lives next to the target so the rename never crosses a
/// filesystem. Concurrent writers each get their own temporary file; the last
/// rename wins and every observed version is complete.
///
/// # Examples
///
/// ```rust,no_run
/// use tmplpack::utils::fs::atomic_write;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// atomic_write(Path::new("public/views.js"), b"(function() {})();")?;
/// # Ok(())
/// # }
/// ```
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".tmplpack-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .with_context(|| format!("Failed to create temp file in: {}", parent.display()))?;

    temp.write_all(content)
        .with_context(|| format!("Failed to write to temp file: {}", temp.path().display()))?;
    temp.as_file().sync_all().with_context(|| "Failed to sync file to disk")?;

    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}
