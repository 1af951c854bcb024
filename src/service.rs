//! Request adapter: maps artifact URLs to subtrees and serves them.
//!
//! [`TemplateService`] owns the published unit tree and the artifact gate. It
//! is framework-agnostic: a host server calls [`TemplateService::handle`] with
//! the request method and URL and acts on the returned [`Outcome`].
//!
//! # URL Layout
//!
//! With prefix `/templates`:
//!
//! | URL                             | Subtree            |
//! |---------------------------------|--------------------|
//! | `/templates.js`                 | the whole tree     |
//! | `/templates/emails.js`          | `emails`           |
//! | `/templates/emails/welcome.js`  | `emails/welcome`   |
//!
//! Anything else, any method other than `GET` and `HEAD`, and any key path
//! with no unit behind it is [`Outcome::PassThrough`].
//!
//! # Concurrency
//!
//! The tree is published as an `Arc` behind a lock. Requests clone the `Arc`
//! and work on that snapshot; [`TemplateService::rebuild`] builds a complete
//! new tree without holding the lock and swaps it in only on success.

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use crate::artifact::{Action, Artifact, ArtifactGate, Served};
use crate::config::BundleConfig;
use crate::constants::ARTIFACT_EXTENSION;
use crate::core::BundleError;
use crate::templating::{TemplateCompiler, TeraCompiler};
use crate::tree::{KeyPath, TreeBuilder, UnitTree};

/// What the host should do with a request.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Not an artifact request; hand it to the next handler.
    PassThrough,
    /// The artifact at `path` is current; let the static file layer serve it.
    Stored { path: PathBuf, action: Action },
    /// Send `artifact` as the response body (`HEAD` callers drop the body).
    Inline { artifact: Arc<Artifact>, action: Action },
}

impl Outcome {
    pub fn action(&self) -> Option<Action> {
        match self {
            Outcome::PassThrough => None,
            Outcome::Stored { action, .. } | Outcome::Inline { action, .. } => Some(*action),
        }
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self, Outcome::PassThrough)
    }
}

/// Serves artifacts for one template bundle.
pub struct TemplateService {
    config: BundleConfig,
    compiler: Arc<dyn TemplateCompiler>,
    tree: RwLock<Arc<UnitTree>>,
    gate: ArtifactGate,
}

impl std::fmt::Debug for TemplateService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateService")
            .field("config", &self.config)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl TemplateService {
    /// Creates a service using [`TeraCompiler`] and builds the initial tree.
    pub fn new(config: BundleConfig) -> Result<Self, BundleError> {
        Self::with_compiler(config, Arc::new(TeraCompiler::new()))
    }

    /// Creates a service with a custom compiler and builds the initial tree.
    ///
    /// The configuration is normalized first; an invalid one is rejected with
    /// [`BundleError::InvalidConfig`].
    pub fn with_compiler(
        config: BundleConfig,
        compiler: Arc<dyn TemplateCompiler>,
    ) -> Result<Self, BundleError> {
        let config = config.normalize()?;
        let tree = build_tree(&config, compiler.as_ref())?;
        let gate = ArtifactGate::new(config.delivery_mode(), &config.prefix, &config.global, config.reload);
        Ok(Self {
            config,
            compiler,
            tree: RwLock::new(Arc::new(tree)),
            gate,
        })
    }

    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// The currently published tree.
    pub fn tree(&self) -> Arc<UnitTree> {
        Arc::clone(&self.tree.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Rebuilds the tree from source and publishes it.
    ///
    /// On failure the previously published tree stays in place. Artifacts held
    /// in memory belong to the old tree and are dropped.
    pub fn rebuild(&self) -> Result<Arc<UnitTree>, BundleError> {
        let tree = Arc::new(build_tree(&self.config, self.compiler.as_ref())?);
        *self.tree.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&tree);
        self.gate.clear();
        tracing::info!("Published unit tree with {} units", tree.len());
        Ok(tree)
    }

    /// Extracts the key path from an artifact URL, or `None` when the URL is
    /// not under the prefix or not an artifact.
    pub fn key_path_for_url(&self, url: &str) -> Option<KeyPath> {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let rest = path.strip_prefix(self.config.prefix.as_str())?;
        let suffix = format!(".{ARTIFACT_EXTENSION}");

        if rest == suffix {
            return Some(KeyPath::root());
        }

        let inner = rest.strip_prefix('/')?.strip_suffix(suffix.as_str())?;
        let key_path = KeyPath::parse(inner);
        (!key_path.is_root()).then_some(key_path)
    }

    /// Handles one request.
    ///
    /// In reload mode the tree is rebuilt first, so every request sees the
    /// current source.
    pub fn handle(&self, method: &str, url: &str) -> Result<Outcome, BundleError> {
        if method != "GET" && method != "HEAD" {
            return Ok(Outcome::PassThrough);
        }
        let Some(key_path) = self.key_path_for_url(url) else {
            return Ok(Outcome::PassThrough);
        };
        tracing::debug!("{} {} -> '{}'", method, url, key_path);

        let tree = if self.config.reload {
            self.rebuild()?
        } else {
            self.tree()
        };

        match self.serve_from(&tree, &key_path) {
            Err(error) if error.is_pass_through() => {
                tracing::debug!("{error}; passing through");
                Ok(Outcome::PassThrough)
            }
            result => result,
        }
    }

    /// Serves the artifact for `key_path` from the published tree.
    ///
    /// Unlike [`handle`](Self::handle), an unknown key path is an error.
    pub fn serve(&self, key_path: &KeyPath) -> Result<Outcome, BundleError> {
        self.serve_from(&self.tree(), key_path)
    }

    fn serve_from(&self, tree: &UnitTree, key_path: &KeyPath) -> Result<Outcome, BundleError> {
        let unit = ArtifactGate::resolve(tree, key_path)?;

        match self.gate.serve_or_build(tree, unit, key_path) {
            Ok(Served::Stored { path, action }) => Ok(Outcome::Stored {
                path,
                action,
            }),
            Ok(Served::Inline { artifact, action }) => Ok(Outcome::Inline {
                artifact,
                action,
            }),
            Err(error @ BundleError::Storage { .. }) if self.config.serve_on_write_failure => {
                tracing::warn!("{error:#}; serving '{}' inline", key_path);
                Ok(Outcome::Inline {
                    artifact: self.gate.generate_inline(tree, unit, key_path),
                    action: Action::Rebuild,
                })
            }
            Err(error) => Err(error),
        }
    }
}

fn build_tree(config: &BundleConfig, compiler: &dyn TemplateCompiler) -> Result<UnitTree, BundleError> {
    TreeBuilder::new(compiler, &config.extension, config.compile.clone())?.build(&config.source)
}
