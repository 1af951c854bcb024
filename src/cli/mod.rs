//! Command-line interface for tmplpack.
//!
//! # Available Commands
//!
//! - `build` - Write artifacts for the given key paths into the public directory
//! - `get` - Run one request through the service, as a host server would
//! - `tree` - Show the unit tree with freshness and origins
//!
//! # Global Options
//!
//! - `--config <path>` - Configuration file (also `TMPLPACK_CONFIG`)
//! - `--source`, `--public`, `--prefix`, `--global`, `--reload` - Override
//!   configuration values
//! - `--verbose` / `--quiet` - Log verbosity (`RUST_LOG` applies otherwise)
//! - `--no-color` - Plain output
//!
//! # Examples
//!
//! ```bash
//! # Write every artifact reachable from the root
//! tmplpack build
//!
//! # Force a rebuild of two subtrees
//! tmplpack build emails layout/sidebar --force
//!
//! # Without a config file
//! tmplpack --source views --prefix /templates get /templates/emails.js
//! ```

mod build;
mod get;
mod tree;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::{BundleConfig, ConfigOverrides, load_config};
use crate::constants::CONFIG_ENV_VAR;
use crate::core::{BundleError, ErrorContext, similar_key_paths};
use crate::tree::UnitTree;

/// Runtime settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` defers to `RUST_LOG`, then `warn`
    pub log_level: Option<String>,

    /// Disable colored output
    pub no_color: bool,

    /// Explicit configuration file
    pub config_path: Option<PathBuf>,

    /// Command-line configuration overrides
    pub overrides: ConfigOverrides,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the global tracing subscriber, writing to stderr.
    pub fn init_logging(&self) {
        if self.no_color {
            colored::control::set_override(false);
        }

        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(!self.no_color)
            .try_init();
    }

    /// Loads the bundle configuration with the overrides applied.
    pub fn load_bundle(&self) -> Result<BundleConfig> {
        load_config(self.config_path.as_deref(), self.overrides.clone())
    }
}

/// Main CLI structure for tmplpack.
#[derive(Parser)]
#[command(
    name = "tmplpack",
    about = "Compile template directories into cached JavaScript bundles",
    version,
    long_about = "tmplpack compiles a directory of templates into a tree of units and \
                  serves any subtree as a self-contained JavaScript artifact, rebuilding \
                  an artifact only when a template under it changed."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Template source directory
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Directory artifacts are written under
    #[arg(long, global = true)]
    public: Option<PathBuf>,

    /// URL prefix artifacts are addressed under
    #[arg(long, global = true)]
    prefix: Option<String>,

    /// Name the artifact publishes its templates under
    #[arg(long, global = true)]
    global: Option<String>,

    /// Rebuild on every request instead of checking freshness
    #[arg(long, global = true)]
    reload: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write artifacts into the public directory
    Build(build::BuildCommand),

    /// Resolve one request URL and print the outcome
    Get(get::GetCommand),

    /// Show the unit tree
    Tree(tree::TreeCommand),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Build the runtime configuration from the parsed flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("off".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            no_color: self.no_color,
            config_path: self.config.clone(),
            overrides: ConfigOverrides {
                source: self.source.clone(),
                public: self.public.clone(),
                prefix: self.prefix.clone(),
                global: self.global.clone(),
                reload: self.reload.then_some(true),
            },
        }
    }

    /// Execute with an explicit runtime configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();
        let bundle = config.load_bundle()?;

        match self.command {
            Commands::Build(cmd) => cmd.execute(bundle).await,
            Commands::Get(cmd) => cmd.execute(bundle).await,
            Commands::Tree(cmd) => cmd.execute(bundle).await,
        }
    }
}

/// Attaches "did you mean" suggestions to a missing key path.
fn with_key_path_suggestions(error: BundleError, tree: &UnitTree) -> anyhow::Error {
    let BundleError::NotFound { key_path } = &error else {
        return error.into();
    };

    let known: Vec<String> = tree.key_paths().iter().map(ToString::to_string).collect();
    let similar = similar_key_paths(key_path, &known);
    let ctx = ErrorContext::new(error);
    if similar.is_empty() {
        ctx.with_suggestion("Run 'tmplpack tree' to list the available key paths").into()
    } else {
        ctx.with_suggestion(format!("Did you mean: {}", similar.join(", "))).into()
    }
}
