//! Global constants used throughout the tmplpack codebase.
//!
//! Naming conventions shared by the tree builder, the artifact serializer and
//! the request adapter live here so the three agree on file extensions, the
//! generated variable names and the published global.

/// Default global name the generated artifact publishes its tree under.
pub const DEFAULT_GLOBAL_NAME: &str = "Templates";

/// Extension (without the dot) of template source files.
pub const TEMPLATE_EXTENSION: &str = "tmpl";

/// Extension (without the dot) of generated artifacts, both on disk and in URLs.
pub const ARTIFACT_EXTENSION: &str = "js";

/// Content type reported for artifacts delivered inline.
pub const ARTIFACT_CONTENT_TYPE: &str = "application/javascript";

/// Name of the local variable holding the resolved subtree inside an artifact.
pub const ROOT_VARIABLE: &str = "T";

/// Namespace object the embedded runtime is installed into.
pub const RUNTIME_NAMESPACE: &str = "tmplpack";

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "tmplpack.toml";

/// Environment variable that overrides the configuration file location.
pub const CONFIG_ENV_VAR: &str = "TMPLPACK_CONFIG";
