//! File system utilities
//!
//! - **Atomic writes**: artifacts are written to a temporary file and renamed
//!   into place, so freshness checks only ever see complete files
//! - **Directories**: idempotent recursive creation
//! - **Metadata**: pinning modification times in tests and fixtures

pub mod atomic;
pub mod dirs;
pub mod metadata;

pub use atomic::atomic_write;
pub use dirs::ensure_dir;
pub use metadata::set_modified_time;
