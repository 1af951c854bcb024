//! tmplpack - incremental template bundles
//!
//! tmplpack compiles a directory of templates into a tree of compiled units
//! and serves any subtree of it as a self-contained JavaScript artifact. Each
//! artifact is rebuilt only when a template somewhere under its subtree has
//! changed since the artifact was last written.
//!
//! # Architecture Overview
//!
//! ```text
//! views/ ──TreeBuilder──▶ UnitTree ──ArtifactGate──▶ public/templates/emails.js
//!                           │  ▲                       (or an in-memory artifact)
//!                 freshness │  │ mark_fresh
//!                           ▼  │
//!                     effective freshness
//! ```
//!
//! - A **unit** is one compiled template: the primary body of a file, a named
//!   inline block, or an empty placeholder for a directory.
//! - Units form a tree that mirrors the source directory. A directory with the
//!   same name as a template file merges under that file's unit.
//! - Every unit carries a **freshness**: the newest modification time in its
//!   subtree. Inline blocks derive theirs from the file that owns them.
//! - The **artifact gate** compares a subtree's freshness with the stored
//!   artifact and either reuses it or serializes the subtree again.
//!
//! # Core Modules
//!
//! - [`tree`] - Unit tree, key paths, freshness tracking and the tree builder
//! - [`templating`] - Compiler seam, Tera-backed compiler and inline block splitting
//! - [`artifact`] - Artifact serialization and the cache gate
//! - [`service`] - Request adapter mapping URLs to subtrees
//! - [`config`] - `tmplpack.toml` parsing, overrides and validation
//! - [`core`] - Error types and user-facing error reporting
//! - [`cli`] - Command-line interface
//! - [`utils`] - Filesystem helpers (atomic writes, directories, timestamps)
//!
//! # Example
//!
//! ```rust,no_run
//! use tmplpack::config::BundleConfig;
//! use tmplpack::service::{Outcome, TemplateService};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = BundleConfig::new("views", "/templates").normalize()?;
//! let service = TemplateService::new(config)?;
//!
//! match service.handle("GET", "/templates/emails.js")? {
//!     Outcome::Inline { artifact, .. } => println!("{}", artifact.body()),
//!     Outcome::Stored { path, .. } => println!("serve {}", path.display()),
//!     Outcome::PassThrough => println!("not ours"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod service;
pub mod templating;
pub mod tree;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
