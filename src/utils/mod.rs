//! Cross-cutting utilities.
//!
//! - [`fs`]: atomic writes, directory creation and modification time pinning

pub mod fs;

pub use fs::{atomic_write, ensure_dir};
