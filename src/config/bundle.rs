//! The bundle configuration: where templates live and how artifacts are served.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::artifact::DeliveryMode;
use crate::constants::{DEFAULT_GLOBAL_NAME, TEMPLATE_EXTENSION};
use crate::core::BundleError;
use crate::templating::CompileFlags;

/// Settings for one template bundle.
///
/// ```toml
/// source = "views"
/// public = "public"          # omit to serve artifacts from memory
/// prefix = "/templates"
/// global = "Templates"
/// reload = false
///
/// [compile]
/// autoescape = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleConfig {
    /// Root directory of the template sources
    pub source: PathBuf,

    /// Directory artifacts are written under; selects persist mode when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<PathBuf>,

    /// URL prefix artifacts are addressed under, e.g. `/templates`
    pub prefix: String,

    /// Name the artifact publishes its tree under
    #[serde(default = "default_global")]
    pub global: String,

    /// Rebuild the tree and every artifact on each request
    #[serde(default)]
    pub reload: bool,

    /// Template file extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Hand the artifact back inline when it cannot be written to `public`
    #[serde(default)]
    pub serve_on_write_failure: bool,

    #[serde(default)]
    pub compile: CompileFlags,
}

fn default_global() -> String {
    DEFAULT_GLOBAL_NAME.to_string()
}

fn default_extension() -> String {
    TEMPLATE_EXTENSION.to_string()
}

/// Values given on the command line, applied over the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub source: Option<PathBuf>,
    pub public: Option<PathBuf>,
    pub prefix: Option<String>,
    pub global: Option<String>,
    pub reload: Option<bool>,
}

impl BundleConfig {
    /// A configuration with defaults for everything but the required fields.
    pub fn new(source: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            public: None,
            prefix: prefix.into(),
            global: default_global(),
            reload: false,
            extension: default_extension(),
            serve_on_write_failure: false,
            compile: CompileFlags::default(),
        }
    }

    /// Builds a configuration from command-line values alone.
    pub fn from_overrides(overrides: ConfigOverrides) -> Result<Self, BundleError> {
        let source = overrides.source.clone().ok_or_else(|| BundleError::InvalidConfig {
            field: "source".to_string(),
            reason: "no configuration file found and no source directory given".to_string(),
        })?;
        let prefix = overrides.prefix.clone().ok_or_else(|| BundleError::InvalidConfig {
            field: "prefix".to_string(),
            reason: "no configuration file found and no URL prefix given".to_string(),
        })?;
        Ok(Self::new(source, prefix).with_overrides(overrides))
    }

    #[must_use]
    pub fn with_public(mut self, public: impl Into<PathBuf>) -> Self {
        self.public = Some(public.into());
        self
    }

    #[must_use]
    pub fn with_reload(mut self, reload: bool) -> Self {
        self.reload = reload;
        self
    }

    /// Replaces every field that has an override.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(source) = overrides.source {
            self.source = source;
        }
        if let Some(public) = overrides.public {
            self.public = Some(public);
        }
        if let Some(prefix) = overrides.prefix {
            self.prefix = prefix;
        }
        if let Some(global) = overrides.global {
            self.global = global;
        }
        if let Some(reload) = overrides.reload {
            self.reload = reload;
        }
        self
    }

    /// Resolves relative `source` and `public` against `base`.
    #[must_use]
    pub fn relative_to(mut self, base: &Path) -> Self {
        if self.source.is_relative() {
            self.source = base.join(&self.source);
        }
        if let Some(public) = self.public.take() {
            self.public = Some(if public.is_relative() {
                base.join(public)
            } else {
                public
            });
        }
        self
    }

    /// Normalizes paths and the prefix, then checks every field.
    ///
    /// Trailing separators are trimmed from `source` and `public`; the prefix
    /// gets exactly one leading `/` and no trailing `/`.
    pub fn normalize(mut self) -> Result<Self, BundleError> {
        self.source = trim_trailing_separators(&self.source);
        self.public = self.public.as_deref().map(trim_trailing_separators);
        self.prefix = normalize_prefix(&self.prefix)?;

        if !crate::artifact::is_identifier(&self.global) {
            return Err(invalid("global", format!("'{}' is not a valid JavaScript identifier", self.global)));
        }
        if self.extension.is_empty() || self.extension.contains(['.', '/', '\\']) {
            return Err(invalid("extension", format!("'{}' is not a bare file extension", self.extension)));
        }
        if !self.source.is_dir() {
            return Err(invalid("source", format!("{} is not a directory", self.source.display())));
        }
        if let Some(public) = &self.public {
            if public.is_file() {
                return Err(invalid("public", format!("{} is a file", public.display())));
            }
        }

        Ok(self)
    }

    /// Persist mode when `public` is set, respond mode otherwise.
    pub fn delivery_mode(&self) -> DeliveryMode {
        match &self.public {
            Some(public) => DeliveryMode::Persist {
                public: public.clone(),
            },
            None => DeliveryMode::Respond,
        }
    }
}

fn invalid(field: &str, reason: String) -> BundleError {
    BundleError::InvalidConfig {
        field: field.to_string(),
        reason,
    }
}

fn normalize_prefix(prefix: &str) -> Result<String, BundleError> {
    let segments: Vec<&str> = prefix.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Err(invalid("prefix", "must name at least one path segment".to_string()));
    }
    if let Some(bad) = segments.iter().find(|s| **s == "." || **s == ".." || s.contains('\\')) {
        return Err(invalid("prefix", format!("segment '{bad}' is not allowed")));
    }
    Ok(format!("/{}", segments.join("/")))
}

fn trim_trailing_separators(path: &Path) -> PathBuf {
    let Some(text) = path.to_str() else {
        return path.to_path_buf();
    };
    let trimmed = text.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        // Keep a filesystem root such as "/" intact.
        path.to_path_buf()
    } else {
        PathBuf::from(trimmed)
    }
}
