//! Template source trees for tests.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tempfile::TempDir;

use crate::config::BundleConfig;
use crate::utils::fs::set_modified_time;

/// A temporary project holding a `views/` source directory and a `public/`
/// output directory.
///
/// Modification times are pinned explicitly so freshness comparisons never
/// depend on filesystem timestamp resolution.
///
/// ```rust,no_run
/// use tmplpack::test_utils::TemplateFixture;
///
/// # fn example() -> anyhow::Result<()> {
/// let fixture = TemplateFixture::new()?;
/// fixture.write("emails/welcome.tmpl", "Hi {{ name }}", 100)?;
/// let config = fixture.persist_config("/templates");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TemplateFixture {
    temp: TempDir,
}

impl TemplateFixture {
    /// Creates an empty project.
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("Failed to create temp dir")?;
        fs::create_dir(temp.path().join("views")).context("Failed to create views dir")?;
        Ok(Self {
            temp,
        })
    }

    /// The standard layout used across tests: `single`, `multiple` (two inline blocks),
    /// `directory/{foo,bar}` with `directory/subdirectory/baz`, and `both`
    /// with a same-named directory.
    pub fn sample() -> Result<Self> {
        let fixture = Self::new()?;
        fixture.write("single.tmpl", "<p>{{ message }}</p>\n", 100)?;
        fixture.write(
            "multiple.tmpl",
            "//-- First.tmpl\n<b>{{ first }}</b>\n//-- Second.tmpl\n<i>{{ second }}</i>\n",
            110,
        )?;
        fixture.write("directory/foo.tmpl", "foo\n", 120)?;
        fixture.write("directory/bar.tmpl", "bar\n", 130)?;
        fixture.write("directory/subdirectory/baz.tmpl", "baz\n", 140)?;
        fixture.write("both.tmpl", "<h1>both</h1>\n//-- Header.tmpl\n<header/>\n", 150)?;
        fixture.write("both/foo.tmpl", "both foo\n", 160)?;
        Ok(fixture)
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn source(&self) -> PathBuf {
        self.temp.path().join("views")
    }

    pub fn public(&self) -> PathBuf {
        self.temp.path().join("public")
    }

    /// Writes a template under the source directory with its mtime set to
    /// `modified_secs` seconds after the epoch.
    pub fn write(&self, relative: &str, content: &str, modified_secs: u64) -> Result<PathBuf> {
        let path = self.source().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        set_modified_time(&path, at(modified_secs))?;
        Ok(path)
    }

    /// Sets the mtime of a file relative to the project root.
    pub fn touch(&self, relative: &str, modified_secs: u64) -> Result<()> {
        set_modified_time(&self.temp.path().join(relative), at(modified_secs))
    }

    /// Configuration writing artifacts under `public/`.
    pub fn persist_config(&self, prefix: &str) -> BundleConfig {
        BundleConfig::new(self.source(), prefix).with_public(self.public())
    }

    /// Configuration keeping artifacts in memory.
    pub fn respond_config(&self, prefix: &str) -> BundleConfig {
        BundleConfig::new(self.source(), prefix)
    }

    /// Writes `tmplpack.toml` at the project root.
    pub fn write_config(&self, content: &str) -> Result<PathBuf> {
        let path = self.temp.path().join("tmplpack.toml");
        fs::write(&path, content).context("Failed to write tmplpack.toml")?;
        Ok(path)
    }
}

/// `secs` seconds after the Unix epoch.
pub fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}
