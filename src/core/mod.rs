//! Core types shared across tmplpack
//!
//! - [`error`]: [`BundleError`], the typed error every layer reports, plus the
//!   CLI-facing [`ErrorContext`] and [`user_friendly_error`].
//! - [`file_error`]: attaches paths and operations to I/O failures.

pub mod error;
pub mod file_error;

pub use error::{BundleError, ErrorContext, similar_key_paths, user_friendly_error};
pub use file_error::{FileOperation, FileResultExt};
