//! Error handling for tmplpack
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`BundleError`]) at the library boundary, so the
//!    request adapter can tell a missing key path (pass through) from a real failure.
//! 2. **User-friendly messages** ([`ErrorContext`]) for the CLI, with details and a
//!    suggestion attached to each error kind.
//!
//! # Error Categories
//!
//! - **Build pass**: [`BundleError::SourceRead`], [`BundleError::Compile`]. Both abort the
//!   whole build; no partially populated tree is ever published.
//! - **Per request**: [`BundleError::NotFound`], [`BundleError::Storage`]. Both abort only
//!   the current request and leave the published tree untouched.
//! - **Startup**: [`BundleError::InvalidConfig`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use tmplpack::core::{BundleError, user_friendly_error};
//!
//! let error = BundleError::NotFound { key_path: "emails/welcome".to_string() };
//! assert!(error.is_pass_through());
//!
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for tmplpack operations.
///
/// Every variant that concerns a file carries the offending path so the
/// message shown to users always names what failed.
#[derive(Error, Debug)]
pub enum BundleError {
    /// A source directory or template file could not be listed, stat'ed or read.
    #[error("Failed to read template source: {}", .path.display())]
    SourceRead {
        /// The file or directory that could not be accessed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The template compiler rejected a unit.
    ///
    /// `block` is set when the rejected text is an inline sub-block rather than
    /// the primary body of the file.
    #[error("Failed to compile template {}{}: {message}", .path.display(), block_suffix(.block))]
    Compile {
        /// Source file containing the rejected text
        path: PathBuf,
        /// Declared name of the inline sub-block, if any
        block: Option<String>,
        /// Compiler diagnostic
        message: String,
    },

    /// No unit exists at the requested key path.
    #[error("No template unit at key path '{key_path}'")]
    NotFound {
        /// Slash-separated key path as requested
        key_path: String,
    },

    /// An artifact could not be persisted.
    #[error("Failed to store artifact: {}", .path.display())]
    Storage {
        /// Destination of the artifact
        path: PathBuf,
        /// Full error chain of the failed filesystem operation
        reason: String,
    },

    /// The configuration is unusable.
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig {
        /// Configuration key that failed validation
        field: String,
        /// Why the value was rejected
        reason: String,
    },
}

fn block_suffix(block: &Option<String>) -> String {
    match block {
        Some(name) => format!(" [{name}]"),
        None => String::new(),
    }
}

impl BundleError {
    /// Returns `true` when the request should fall through to the next handler
    /// instead of failing.
    #[must_use]
    pub fn is_pass_through(&self) -> bool {
        matches!(self, BundleError::NotFound { .. })
    }

    /// Returns `true` for errors raised while building the unit tree.
    #[must_use]
    pub fn is_build_error(&self) -> bool {
        matches!(self, BundleError::SourceRead { .. } | BundleError::Compile { .. })
    }
}

/// Error wrapper with user-facing details and a suggestion.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error, or `None` for a plain message
    pub error: Option<BundleError>,
    /// Message used when no typed error is available
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub fn new(error: BundleError) -> Self {
        Self {
            message: error.to_string(),
            error: Some(error),
            suggestion: None,
            details: None,
        }
    }

    /// Creates a context for an error that has no [`BundleError`] variant.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            error: None,
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Prints the error to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// [`BundleError`]s get tailored suggestions; TOML errors point at the
/// configuration file; anything else is shown with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<ErrorContext>() {
        Ok(ctx) => return ctx,
        Err(error) => error,
    };

    let error = match error.downcast::<BundleError>() {
        Ok(bundle_error) => return create_error_context(bundle_error),
        Err(error) => error,
    };

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::message(format!("Failed to parse configuration: {toml_error}"))
            .with_suggestion("Check the TOML syntax of tmplpack.toml. Verify quotes, brackets, and key names");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::message(message)
}

fn create_error_context(error: BundleError) -> ErrorContext {
    match &error {
        BundleError::SourceRead { source, .. } => {
            let details = format!("{source}");
            ErrorContext::new(error)
                .with_details(details)
                .with_suggestion("Check that the source directory exists and is readable")
        }
        BundleError::Compile { block, .. } => {
            let suggestion = if block.is_some() {
                "Fix the template syntax in the named block (blocks start at a `//-- <name>.tmpl` line)"
            } else {
                "Fix the template syntax: variables use {{ var }}, control flow uses {% %}"
            };
            ErrorContext::new(error)
                .with_suggestion(suggestion)
                .with_details("A template that fails to compile aborts the whole build")
        }
        BundleError::NotFound { .. } => ErrorContext::new(error)
            .with_suggestion("Run 'tmplpack tree' to list the available key paths"),
        BundleError::Storage { reason, .. } => {
            let details = reason.clone();
            ErrorContext::new(error)
                .with_details(details)
                .with_suggestion("Check permissions of the public directory, or enable serve_on_write_failure")
        }
        BundleError::InvalidConfig { .. } => ErrorContext::new(error)
            .with_suggestion("Check tmplpack.toml or the command-line overrides"),
    }
}

/// Finds known key paths similar to a missing one, closest first.
///
/// Used by the CLI to turn a [`BundleError::NotFound`] into a "did you mean"
/// suggestion.
#[must_use]
pub fn similar_key_paths(missing: &str, known: &[String]) -> Vec<String> {
    let threshold = (missing.len() / 2).max(1);
    let mut scored: Vec<(usize, &String)> = known
        .iter()
        .map(|candidate| (strsim::levenshtein(missing, candidate), candidate))
        .filter(|(distance, _)| *distance <= threshold)
        .collect();
    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    scored.into_iter().take(3).map(|(_, candidate)| candidate.clone()).collect()
}
