//! Building a unit tree from a source directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use walkdir::WalkDir;

use super::{UnitId, UnitOrigin, UnitTree};
use crate::core::{BundleError, FileResultExt};
use crate::templating::{BlockSplitter, CompileFlags, EmptyRenderer, TemplateCompiler};

/// Walks a source directory and compiles every template in it.
///
/// A build either returns a complete tree or an error; nothing partial ever
/// escapes. Building is read-only with respect to the source tree.
pub struct TreeBuilder<'a> {
    compiler: &'a dyn TemplateCompiler,
    flags: CompileFlags,
    extension: String,
    splitter: BlockSplitter,
}

impl<'a> TreeBuilder<'a> {
    /// Creates a builder for templates with the given extension (without the dot).
    pub fn new(
        compiler: &'a dyn TemplateCompiler,
        extension: &str,
        flags: CompileFlags,
    ) -> Result<Self, BundleError> {
        let splitter = BlockSplitter::new(extension).map_err(|e| BundleError::InvalidConfig {
            field: "extension".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            compiler,
            flags,
            extension: extension.to_string(),
            splitter,
        })
    }

    /// Builds the tree rooted at `source_root`.
    pub fn build(&self, source_root: &Path) -> Result<UnitTree, BundleError> {
        let metadata = fs::metadata(source_root).with_source_context(source_root)?;
        if !metadata.is_dir() {
            return Err(BundleError::SourceRead {
                path: source_root.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotADirectory,
                    "template source must be a directory",
                ),
            });
        }

        let mut tree = UnitTree::new(
            Arc::new(EmptyRenderer),
            UnitOrigin::Root(source_root.to_path_buf()),
            Some(UNIX_EPOCH),
        );
        let root = tree.root();
        self.build_dir(&mut tree, root, source_root)?;

        tracing::info!("Built {} template units from {}", tree.len() - 1, source_root.display());
        Ok(tree)
    }

    /// Adds the contents of `dir` under `parent`: template files first, then
    /// subdirectories, each group in name order.
    fn build_dir(&self, tree: &mut UnitTree, parent: UnitId, dir: &Path) -> Result<(), BundleError> {
        let (files, dirs) = self.list_dir(dir)?;

        for file in &files {
            self.add_file(tree, parent, file)?;
        }

        for subdir in &dirs {
            let name = file_name(subdir);
            let unit = match tree.child(parent, &name) {
                Some(existing) => existing,
                None => tree.insert_child(
                    parent,
                    &name,
                    Arc::new(EmptyRenderer),
                    UnitOrigin::Placeholder(subdir.clone()),
                    Some(UNIX_EPOCH),
                ),
            };
            self.build_dir(tree, unit, subdir)?;
        }

        Ok(())
    }

    fn list_dir(&self, dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>), BundleError> {
        let mut files = Vec::new();
        let mut dirs = Vec::new();

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                BundleError::SourceRead {
                    path,
                    source,
                }
            })?;

            let file_type = entry.file_type();
            if file_type.is_dir() {
                dirs.push(entry.into_path());
            } else if file_type.is_file() && self.is_template(entry.path()) {
                files.push(entry.into_path());
            }
        }

        Ok((files, dirs))
    }

    fn is_template(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == self.extension.as_str())
    }

    /// Compiles one template file and its inline blocks.
    fn add_file(&self, tree: &mut UnitTree, parent: UnitId, path: &Path) -> Result<(), BundleError> {
        let modified = fs::metadata(path)
            .and_then(|metadata| metadata.modified())
            .with_source_context(path)?;
        let text = fs::read_to_string(path).with_source_context(path)?;
        let split = self.splitter.split(&text);
        let filename = path.display().to_string();

        let renderer = self
            .compiler
            .compile(split.primary, &self.flags.for_file(filename.as_str()))
            .map_err(|failure| BundleError::Compile {
                path: path.to_path_buf(),
                block: None,
                message: failure.message,
            })?;

        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let unit = tree.insert_child(parent, &name, renderer, UnitOrigin::File(path.to_path_buf()), None);
        tree.mark_fresh(unit, modified);
        tracing::debug!("Compiled {} as '{}'", filename, tree.key_path(unit));

        for (block_name, body) in split.blocks {
            let renderer = self
                .compiler
                .compile(body, &self.flags.for_file(format!("{filename} [{block_name}]")))
                .map_err(|failure| BundleError::Compile {
                    path: path.to_path_buf(),
                    block: Some(block_name.clone()),
                    message: failure.message,
                })?;
            tree.insert_child(
                unit,
                &block_name,
                renderer,
                UnitOrigin::Block {
                    file: path.to_path_buf(),
                    name: block_name.clone(),
                },
                None,
            );
        }

        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
}
