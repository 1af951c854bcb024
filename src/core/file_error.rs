//! File operation context for source and artifact I/O.
//!
//! Raw [`std::io::Error`]s say what went wrong but not which file or why the
//! file was being touched. [`FileResultExt`] attaches both and turns the error
//! into the matching [`BundleError`] variant: reads of the template source
//! become [`BundleError::SourceRead`], writes of artifacts become
//! [`BundleError::Storage`].

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::error::BundleError;

/// The kind of file operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    Write,
    Metadata,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Write => write!(f, "writing"),
            FileOperation::Metadata => write!(f, "getting file metadata"),
        }
    }
}

/// Extension trait converting I/O results into [`BundleError`]s with the path attached.
pub trait FileResultExt<T> {
    /// Maps a failure while accessing the template source to [`BundleError::SourceRead`].
    fn with_source_context(self, path: impl Into<PathBuf>) -> Result<T, BundleError>;

    /// Maps a failure while persisting an artifact to [`BundleError::Storage`].
    fn with_storage_context(
        self,
        operation: FileOperation,
        path: impl Into<PathBuf>,
    ) -> Result<T, BundleError>;
}

impl<T> FileResultExt<T> for Result<T, std::io::Error> {
    fn with_source_context(self, path: impl Into<PathBuf>) -> Result<T, BundleError> {
        self.map_err(|source| BundleError::SourceRead {
            path: path.into(),
            source,
        })
    }

    fn with_storage_context(
        self,
        operation: FileOperation,
        path: impl Into<PathBuf>,
    ) -> Result<T, BundleError> {
        self.map_err(|io_error| BundleError::Storage {
            path: path.into(),
            reason: format!("{operation} failed: {io_error}"),
        })
    }
}

/// Returns the modification time of `path`, or `None` when it does not exist.
///
/// Any other failure (permissions, a directory in the way) is a storage error:
/// the gate cannot tell whether the artifact is current.
pub fn modified_if_exists(path: &Path) -> Result<Option<SystemTime>, BundleError> {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => metadata
            .modified()
            .map(Some)
            .with_storage_context(FileOperation::Metadata, path),
        Ok(_) => Err(BundleError::Storage {
            path: path.to_path_buf(),
            reason: "artifact path exists but is not a file".to_string(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_storage_context(FileOperation::Metadata, path),
    }
}
