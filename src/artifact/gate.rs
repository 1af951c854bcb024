//! The artifact cache gate: build an artifact only when its subtree changed.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use dashmap::DashMap;

use super::Artifact;
use crate::constants::ARTIFACT_EXTENSION;
use crate::core::file_error::modified_if_exists;
use crate::core::{BundleError, FileOperation};
use crate::tree::{KeyPath, UnitId, UnitTree};
use crate::utils::fs::atomic_write;

/// What the gate did for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The existing artifact is at least as new as its subtree.
    Reuse,
    /// A new artifact was generated.
    Rebuild,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Reuse => write!(f, "reused"),
            Action::Rebuild => write!(f, "rebuilt"),
        }
    }
}

/// What is known about an existing artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactMeta {
    pub modified: SystemTime,
}

impl ArtifactMeta {
    pub fn new(modified: SystemTime) -> Self {
        Self {
            modified,
        }
    }
}

/// Where generated artifacts go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Write artifacts under this public directory for a static file layer.
    Persist { public: PathBuf },
    /// Keep artifacts in memory and hand them back to the caller.
    Respond,
}

/// Result of [`ArtifactGate::serve_or_build`].
#[derive(Debug, Clone)]
pub enum Served {
    /// The artifact on disk at `path` is current.
    Stored { path: PathBuf, action: Action },
    /// The artifact to send back.
    Inline { artifact: Arc<Artifact>, action: Action },
}

impl Served {
    pub fn action(&self) -> Action {
        match self {
            Served::Stored { action, .. } | Served::Inline { action, .. } => *action,
        }
    }
}

/// Decides, per requested subtree, whether to reuse or rebuild its artifact.
///
/// One gate covers every operating mode: [`DeliveryMode`] picks where
/// artifacts live and `always_rebuild` disables the freshness check.
#[derive(Debug)]
pub struct ArtifactGate {
    mode: DeliveryMode,
    prefix_segments: Vec<String>,
    global: String,
    always_rebuild: bool,
    memory: DashMap<KeyPath, CachedArtifact>,
}

/// An in-memory artifact and the build of the tree it was generated from.
#[derive(Debug, Clone)]
struct CachedArtifact {
    tree_built_at: SystemTime,
    artifact: Arc<Artifact>,
}

impl ArtifactGate {
    /// Creates a gate. `prefix` is the URL prefix artifacts are addressed
    /// under; its segments also name the output directory in persist mode.
    pub fn new(mode: DeliveryMode, prefix: &str, global: &str, always_rebuild: bool) -> Self {
        Self {
            mode,
            prefix_segments: prefix.split('/').filter(|s| !s.is_empty()).map(str::to_string).collect(),
            global: global.to_string(),
            always_rebuild,
            memory: DashMap::new(),
        }
    }

    pub fn mode(&self) -> &DeliveryMode {
        &self.mode
    }

    pub fn always_rebuild(&self) -> bool {
        self.always_rebuild
    }

    /// Finds the unit at `key_path`.
    pub fn resolve(tree: &UnitTree, key_path: &KeyPath) -> Result<UnitId, BundleError> {
        tree.resolve(key_path).ok_or_else(|| BundleError::NotFound {
            key_path: key_path.to_string(),
        })
    }

    /// Reuse only when not forced and the existing artifact is at least as new
    /// as the unit's effective freshness.
    pub fn decide(
        tree: &UnitTree,
        unit: UnitId,
        existing: Option<&ArtifactMeta>,
        always_rebuild: bool,
    ) -> Action {
        match existing {
            Some(meta) if !always_rebuild && meta.modified >= tree.effective_freshness(unit) => {
                Action::Reuse
            }
            _ => Action::Rebuild,
        }
    }

    /// Output file for `key_path` in persist mode.
    ///
    /// `<public>/<prefix>/<key path>.js`, or `<public>/<prefix>.js` for the root.
    pub fn output_path(&self, key_path: &KeyPath) -> Result<Option<PathBuf>, BundleError> {
        match &self.mode {
            DeliveryMode::Persist { public } => self.persist_path(public, key_path).map(Some),
            DeliveryMode::Respond => Ok(None),
        }
    }

    fn persist_path(&self, public: &Path, key_path: &KeyPath) -> Result<PathBuf, BundleError> {
        let segments: Vec<&str> = self
            .prefix_segments
            .iter()
            .chain(key_path.segments())
            .map(String::as_str)
            .collect();

        if let Some(segment) = segments.iter().find(|segment| !is_safe_segment(segment)) {
            return Err(BundleError::Storage {
                path: public.to_path_buf(),
                reason: format!("'{segment}' cannot be used as a file name"),
            });
        }
        let Some((last, dirs)) = segments.split_last() else {
            return Err(BundleError::Storage {
                path: public.to_path_buf(),
                reason: "the root artifact needs a non-empty prefix to be named".to_string(),
            });
        };

        let mut path = public.to_path_buf();
        path.extend(dirs);
        path.push(format!("{last}.{ARTIFACT_EXTENSION}"));
        Ok(path)
    }

    /// Reuses or rebuilds the artifact for `unit`, according to the mode.
    pub fn serve_or_build(
        &self,
        tree: &UnitTree,
        unit: UnitId,
        key_path: &KeyPath,
    ) -> Result<Served, BundleError> {
        match &self.mode {
            DeliveryMode::Persist { public } => {
                let path = self.persist_path(public, key_path)?;
                let action = self.persist(tree, unit, &path)?;
                Ok(Served::Stored {
                    path,
                    action,
                })
            }
            DeliveryMode::Respond => {
                let (artifact, action) = self.respond(tree, unit, key_path);
                Ok(Served::Inline {
                    artifact,
                    action,
                })
            }
        }
    }

    fn persist(&self, tree: &UnitTree, unit: UnitId, path: &Path) -> Result<Action, BundleError> {
        let existing = modified_if_exists(path)?.map(ArtifactMeta::new);
        let action = Self::decide(tree, unit, existing.as_ref(), self.always_rebuild);

        if action == Action::Reuse {
            tracing::debug!("Artifact {} is current", path.display());
            return Ok(action);
        }

        let artifact = Artifact::generate(tree, unit, &self.global);
        atomic_write(path, artifact.body().as_bytes()).map_err(|e| BundleError::Storage {
            path: path.to_path_buf(),
            reason: format!("{} failed: {e:#}", FileOperation::Write),
        })?;
        tracing::info!("Wrote artifact {} ({} bytes)", path.display(), artifact.body().len());
        Ok(action)
    }

    fn respond(&self, tree: &UnitTree, unit: UnitId, key_path: &KeyPath) -> (Arc<Artifact>, Action) {
        // Entries generated from another tree build never match this subtree.
        let cached = self
            .memory
            .get(key_path)
            .filter(|entry| entry.tree_built_at == tree.built_at())
            .map(|entry| Arc::clone(&entry.artifact));
        let existing = cached.as_ref().map(|artifact| ArtifactMeta::new(artifact.generated_at()));

        match (Self::decide(tree, unit, existing.as_ref(), self.always_rebuild), cached) {
            (Action::Reuse, Some(artifact)) => {
                tracing::debug!("Serving cached artifact for '{}'", key_path);
                (artifact, Action::Reuse)
            }
            _ => {
                let artifact = self.generate_inline(tree, unit, key_path);
                (artifact, Action::Rebuild)
            }
        }
    }

    /// Generates an artifact without touching storage and remembers it.
    ///
    /// Used for respond mode and as the fallback when persisting fails.
    pub fn generate_inline(&self, tree: &UnitTree, unit: UnitId, key_path: &KeyPath) -> Arc<Artifact> {
        let artifact = Arc::new(Artifact::generate(tree, unit, &self.global));
        tracing::debug!("Generated artifact for '{}' ({} bytes)", key_path, artifact.body().len());
        self.memory.insert(
            key_path.clone(),
            CachedArtifact {
                tree_built_at: tree.built_at(),
                artifact: Arc::clone(&artifact),
            },
        );
        artifact
    }

    /// Drops every in-memory artifact.
    pub fn clear(&self) {
        self.memory.clear();
    }
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}
