//! Tera-backed compiler and the renderers it produces.

use std::fmt;
use std::sync::Arc;
use tera::{Context as TeraContext, Tera};

use super::{CompileFailure, CompileOptions, Renderer, TemplateCompiler, js_string_literal};
use crate::constants::RUNTIME_NAMESPACE;

/// Name every unit is registered under inside its private Tera instance.
const UNIT_TEMPLATE_NAME: &str = "unit";

/// Tags that would need other templates at render time.
const UNSUPPORTED_TAGS: [&str; 3] = ["include", "extends", "import"];

/// Returns the first `{% include %}`, `{% extends %}` or `{% import %}` tag in `source`.
fn find_unsupported_tag(source: &str) -> Option<&'static str> {
    source.match_indices("{%").find_map(|(start, _)| {
        let rest = source[start + 2..].trim_start_matches('-').trim_start();
        UNSUPPORTED_TAGS.into_iter().find(|tag| {
            rest.strip_prefix(tag)
                .is_some_and(|after| !after.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
        })
    })
}

/// Compiles templates with Tera.
///
/// Each unit gets its own Tera instance holding exactly one template, so units
/// never see each other and can be dropped with the tree that owns them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeraCompiler;

impl TeraCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateCompiler for TeraCompiler {
    fn compile(
        &self,
        source: &str,
        options: &CompileOptions,
    ) -> Result<Arc<dyn Renderer>, CompileFailure> {
        if let Some(tag) = find_unsupported_tag(source) {
            return Err(CompileFailure::new(format!(
                "{}: '{{% {tag} %}}' is not supported in standalone templates",
                options.filename
            )));
        }

        let mut tera = Tera::default();
        tera.autoescape_on(if options.flags.autoescape {
            vec![""]
        } else {
            vec![]
        });
        tera.add_raw_template(UNIT_TEMPLATE_NAME, source).map_err(|e| {
            CompileFailure::new(format!("{}: {}", options.filename, format_tera_error(&e)))
        })?;

        tracing::debug!("Compiled {} ({} bytes)", options.filename, source.len());

        Ok(Arc::new(TeraRenderer {
            filename: options.filename.clone(),
            source: source.to_string(),
            autoescape: options.flags.autoescape,
            debug: options.flags.debug,
            tera,
        }))
    }
}

/// Flattens a Tera error and its causes into one line.
fn format_tera_error(error: &tera::Error) -> String {
    use std::error::Error as _;

    let mut parts = vec![error.to_string()];
    let mut source = error.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ").replace('\n', " ")
}

/// A template compiled by [`TeraCompiler`].
pub struct TeraRenderer {
    filename: String,
    source: String,
    autoescape: bool,
    debug: bool,
    tera: Tera,
}

impl fmt::Debug for TeraRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeraRenderer")
            .field("filename", &self.filename)
            .field("source_len", &self.source.len())
            .field("autoescape", &self.autoescape)
            .finish()
    }
}

impl Renderer for TeraRenderer {
    fn render(&self, context: &TeraContext) -> anyhow::Result<String> {
        self.tera.render(UNIT_TEMPLATE_NAME, context).map_err(|e| {
            anyhow::anyhow!("Failed to render {}: {}", self.filename, format_tera_error(&e))
        })
    }

    fn to_code(&self) -> String {
        let mut code = String::from("function anonymous(locals) {\n");
        if self.debug {
            code.push_str(&format!("// source: {}\n", self.filename.replace('\n', " ")));
        }
        code.push_str(&format!(
            "return {RUNTIME_NAMESPACE}.render({}, locals, {});\n}}",
            js_string_literal(&self.source),
            self.autoescape
        ));
        code
    }
}

/// Renderer of a placeholder unit: always renders to the empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyRenderer;

impl Renderer for EmptyRenderer {
    fn render(&self, _context: &TeraContext) -> anyhow::Result<String> {
        Ok(String::new())
    }

    fn to_code(&self) -> String {
        "function anonymous(locals) {\nreturn \"\";\n}".to_string()
    }
}
