//! Key paths: the names leading from the root of a unit tree to one unit.

use std::fmt;
use std::path::PathBuf;

/// A sequence of unit names addressing a unit from the root.
///
/// The empty key path addresses the root itself. Empty segments are dropped on
/// construction, so `"a//b/"` and `"a/b"` address the same unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath(Vec<String>);

impl KeyPath {
    /// The key path of the root unit.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Builds a key path from individual names.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).filter(|s: &String| !s.is_empty()).collect())
    }

    /// Parses a slash-separated key path such as `"dir/sub"`.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self::new(path.split('/'))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns this key path extended by one name.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }

    /// The key path as a relative filesystem path, one component per segment.
    pub fn to_relative_path(&self) -> PathBuf {
        self.0.iter().collect()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}
