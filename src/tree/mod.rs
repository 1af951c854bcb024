//! The unit tree: compiled templates arranged like the source directory.
//!
//! Units live in an arena owned by [`UnitTree`] and refer to each other by
//! [`UnitId`]. The parent link is a plain index, so the tree has no reference
//! cycles and is dropped wholesale when a rebuild replaces it.
//!
//! # Structure
//!
//! For a source directory
//!
//! ```text
//! views/
//! ├── layout.tmpl          (primary body + block "Footer")
//! ├── emails/
//! │   ├── welcome.tmpl
//! │   └── reset.tmpl
//! └── layout/
//!     └── sidebar.tmpl
//! ```
//!
//! the builder produces
//!
//! ```text
//! <root>
//! ├── layout               file
//! │   ├── Footer           inline block
//! │   └── sidebar          file (directory merged under the same-named file)
//! └── emails               placeholder
//!     ├── reset            file
//!     └── welcome          file
//! ```
//!
//! Files are processed before directories at each level, which is what lets
//! `layout/` attach under `layout.tmpl` instead of replacing it.

mod builder;
mod freshness;
mod key_path;

pub use builder::TreeBuilder;
pub use key_path::KeyPath;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::templating::Renderer;

/// Index of a unit inside its [`UnitTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(usize);

/// Where a unit came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOrigin {
    /// The source root directory
    Root(PathBuf),
    /// Primary body of a template file
    File(PathBuf),
    /// Named inline block of a template file
    Block { file: PathBuf, name: String },
    /// Directory without a same-named template file
    Placeholder(PathBuf),
}

impl UnitOrigin {
    /// Short label used in listings.
    pub fn kind(&self) -> &'static str {
        match self {
            UnitOrigin::Root(_) => "root",
            UnitOrigin::File(_) => "file",
            UnitOrigin::Block { .. } => "block",
            UnitOrigin::Placeholder(_) => "directory",
        }
    }

    /// The file or directory the unit was built from.
    pub fn path(&self) -> &Path {
        match self {
            UnitOrigin::Root(path) | UnitOrigin::File(path) | UnitOrigin::Placeholder(path) => path,
            UnitOrigin::Block { file, .. } => file,
        }
    }
}

/// One compiled template plus its bookkeeping.
#[derive(Debug)]
pub struct Unit {
    name: String,
    renderer: Arc<dyn Renderer>,
    own_freshness: Option<SystemTime>,
    parent: Option<UnitId>,
    children: Vec<UnitId>,
    origin: UnitOrigin,
}

impl Unit {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn renderer(&self) -> &Arc<dyn Renderer> {
        &self.renderer
    }

    /// Stored freshness; `None` means the unit follows its parent.
    pub fn own_freshness(&self) -> Option<SystemTime> {
        self.own_freshness
    }

    pub fn parent(&self) -> Option<UnitId> {
        self.parent
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[UnitId] {
        &self.children
    }

    pub fn origin(&self) -> &UnitOrigin {
        &self.origin
    }
}

/// An immutable-once-published tree of compiled units.
#[derive(Debug)]
pub struct UnitTree {
    units: Vec<Unit>,
    built_at: SystemTime,
}

impl UnitTree {
    /// Creates a tree holding only a root unit.
    pub fn new(
        renderer: Arc<dyn Renderer>,
        origin: UnitOrigin,
        own_freshness: Option<SystemTime>,
    ) -> Self {
        Self {
            units: vec![Unit {
                name: String::new(),
                renderer,
                own_freshness,
                parent: None,
                children: Vec::new(),
                origin,
            }],
            built_at: SystemTime::now(),
        }
    }

    pub fn root(&self) -> UnitId {
        UnitId(0)
    }

    /// Returns the unit for an id handed out by this tree.
    pub fn unit(&self, id: UnitId) -> &Unit {
        &self.units[id.0]
    }

    fn unit_mut(&mut self, id: UnitId) -> &mut Unit {
        &mut self.units[id.0]
    }

    /// When this tree was assembled.
    pub fn built_at(&self) -> SystemTime {
        self.built_at
    }

    /// Looks up a direct child by name.
    pub fn child(&self, parent: UnitId, name: &str) -> Option<UnitId> {
        self.unit(parent).children.iter().copied().find(|&child| self.unit(child).name == name)
    }

    /// Attaches a new unit under `parent`.
    ///
    /// An existing child with the same name is replaced in its position; the
    /// replaced unit and its subtree become unreachable.
    pub fn insert_child(
        &mut self,
        parent: UnitId,
        name: &str,
        renderer: Arc<dyn Renderer>,
        origin: UnitOrigin,
        own_freshness: Option<SystemTime>,
    ) -> UnitId {
        let id = UnitId(self.units.len());
        self.units.push(Unit {
            name: name.to_string(),
            renderer,
            own_freshness,
            parent: Some(parent),
            children: Vec::new(),
            origin,
        });

        match self.child(parent, name) {
            Some(existing) => {
                tracing::debug!("Replacing unit '{}' under {}", name, self.key_path(parent));
                let siblings = &mut self.unit_mut(parent).children;
                if let Some(slot) = siblings.iter_mut().find(|slot| **slot == existing) {
                    *slot = id;
                }
            }
            None => self.unit_mut(parent).children.push(id),
        }
        id
    }

    /// Walks `key_path` from the root, one name at a time.
    pub fn resolve(&self, key_path: &KeyPath) -> Option<UnitId> {
        key_path
            .segments()
            .iter()
            .try_fold(self.root(), |current, name| self.child(current, name))
    }

    /// Key path leading from the root to `id`.
    pub fn key_path(&self, id: UnitId) -> KeyPath {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(unit_id) = current {
            let unit = self.unit(unit_id);
            if unit.parent.is_some() {
                names.push(unit.name.clone());
            }
            current = unit.parent;
        }
        names.reverse();
        KeyPath::new(names)
    }

    /// Pre-order traversal of `id` and all of its descendants.
    pub fn descendants(&self, id: UnitId) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![id],
        }
    }

    /// Number of units reachable from the root.
    pub fn len(&self) -> usize {
        self.descendants(self.root()).count()
    }

    /// `true` when the tree holds nothing but its root.
    pub fn is_empty(&self) -> bool {
        self.unit(self.root()).children.is_empty()
    }

    /// Key paths of every reachable non-root unit, in pre-order.
    pub fn key_paths(&self) -> Vec<KeyPath> {
        self.descendants(self.root()).skip(1).map(|id| self.key_path(id)).collect()
    }
}

/// Iterator returned by [`UnitTree::descendants`].
pub struct PreOrder<'a> {
    tree: &'a UnitTree,
    stack: Vec<UnitId>,
}

impl Iterator for PreOrder<'_> {
    type Item = UnitId;

    fn next(&mut self) -> Option<UnitId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.unit(id).children.iter().rev().copied());
        Some(id)
    }
}
