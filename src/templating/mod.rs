//! Template compiler seam.
//!
//! The unit tree never looks inside a template. It hands source text to a
//! [`TemplateCompiler`] and keeps the [`Renderer`] it gets back. A renderer can
//! do two things: render server-side against a [`tera::Context`], and emit its
//! client-side code (a JavaScript function expression) for artifact
//! serialization.
//!
//! [`TeraCompiler`] is the stock compiler. It validates templates with Tera and
//! emits functions that call into the small runtime bundled with every
//! artifact ([`RUNTIME_SOURCE`]).
//!
//! # Inline Blocks
//!
//! A single source file may carry several templates. A line of the form
//! `//-- <name>.tmpl` starts a named block that runs to the next such line or
//! to the end of the file; text before the first delimiter is the primary
//! body. See [`BlockSplitter`].
//!
//! ```text
//! <h1>{{ title }}</h1>
//! //-- Row.tmpl
//! <tr><td>{{ name }}</td></tr>
//! ```
//!
//! # Syntax Restrictions
//!
//! Compiled units are standalone, so the following Tera tags are rejected at
//! compile time:
//! - `{% include %}`
//! - `{% extends %}`
//! - `{% import %}`

mod blocks;
mod renderer;

pub use blocks::{BlockSplitter, SplitSource};
pub use renderer::{EmptyRenderer, TeraCompiler, TeraRenderer};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Client runtime inlined verbatim into every artifact.
pub const RUNTIME_SOURCE: &str = include_str!("runtime.js");

/// A compiled template.
pub trait Renderer: Send + Sync + fmt::Debug {
    /// Renders the template server-side.
    fn render(&self, context: &tera::Context) -> anyhow::Result<String>;

    /// Returns the client-side form of this renderer as a JavaScript function
    /// expression.
    fn to_code(&self) -> String;
}

/// Compiles template source text into a [`Renderer`].
pub trait TemplateCompiler: Send + Sync {
    fn compile(
        &self,
        source: &str,
        options: &CompileOptions,
    ) -> Result<Arc<dyn Renderer>, CompileFailure>;
}

/// Compiler switches shared by every unit of a build, configured through the
/// `[compile]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileFlags {
    /// Escape HTML in interpolated values
    pub autoescape: bool,
    /// Embed the source filename in generated renderer code
    pub debug: bool,
}

impl Default for CompileFlags {
    fn default() -> Self {
        Self {
            autoescape: true,
            debug: false,
        }
    }
}

impl CompileFlags {
    /// Builds per-unit options for the given compiler filename.
    #[must_use]
    pub fn for_file(&self, filename: impl Into<String>) -> CompileOptions {
        CompileOptions {
            filename: filename.into(),
            flags: self.clone(),
        }
    }
}

/// Options for one compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Name reported in diagnostics: the file path, plus ` [<block>]` for inline blocks
    pub filename: String,
    pub flags: CompileFlags,
}

/// Diagnostic returned by a compiler that rejected a template.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct CompileFailure {
    pub message: String,
}

impl CompileFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Encodes a string as a JavaScript string literal.
pub(crate) fn js_string_literal(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}
