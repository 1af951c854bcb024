//! Artifacts: a subtree of compiled units serialized to loadable JavaScript.
//!
//! An artifact is self-contained. It embeds the client runtime, binds the
//! resolved unit to `T` and every descendant to `T.<dotted key>`, then
//! publishes `T` under the configured global name, either on
//! `module.exports` (CommonJS) or on `window`.
//!
//! ```text
//! (function() {
//! var tmplpack = {};
//! (function(exports) {
//! ...runtime...
//! })(tmplpack);
//!
//! var T = {};
//! T = function anonymous(locals) { ... };
//! T.foo = function anonymous(locals) { ... };
//! T.sub.baz = function anonymous(locals) { ... };
//! typeof(module) === 'object' && typeof(module.exports) === 'object' ? module.exports.Templates = T : window.Templates = T;
//! })();
//! ```
//!
//! Only renderer code is emitted; parent links and freshness stay inside the
//! tree.

mod gate;

pub use gate::{Action, ArtifactGate, ArtifactMeta, DeliveryMode, Served};

use std::time::SystemTime;

use crate::constants::{ARTIFACT_CONTENT_TYPE, ROOT_VARIABLE, RUNTIME_NAMESPACE};
use crate::templating::{RUNTIME_SOURCE, js_string_literal};
use crate::tree::{KeyPath, UnitId, UnitTree};

/// A serialized subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    key_path: KeyPath,
    body: String,
    generated_at: SystemTime,
}

impl Artifact {
    /// Serializes `unit` and its descendants.
    pub fn generate(tree: &UnitTree, unit: UnitId, global: &str) -> Self {
        Self {
            key_path: tree.key_path(unit),
            body: serialize_subtree(tree, unit, global),
            generated_at: SystemTime::now(),
        }
    }

    /// Key path of the unit the artifact was generated from.
    pub fn key_path(&self) -> &KeyPath {
        &self.key_path
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn generated_at(&self) -> SystemTime {
        self.generated_at
    }

    pub fn content_type(&self) -> &'static str {
        ARTIFACT_CONTENT_TYPE
    }
}

/// Renders the JavaScript for the subtree rooted at `unit`.
pub fn serialize_subtree(tree: &UnitTree, unit: UnitId, global: &str) -> String {
    let mut body = String::from("(function() {\n");

    body.push_str(&format!("var {RUNTIME_NAMESPACE} = {{}};\n(function(exports) {{\n"));
    body.push_str(RUNTIME_SOURCE);
    if !RUNTIME_SOURCE.ends_with('\n') {
        body.push('\n');
    }
    body.push_str(&format!("}})({RUNTIME_NAMESPACE});\n"));

    body.push_str(&format!("\nvar {ROOT_VARIABLE} = {{}};\n"));
    for id in tree.descendants(unit) {
        let target = binding_target(tree, unit, id);
        let code = tree.unit(id).renderer().to_code();
        body.push_str(&format!("{target} = {code};\n"));
    }

    body.push_str(&format!(
        "typeof(module) === 'object' && typeof(module.exports) === 'object' \
         ? module.exports.{global} = {ROOT_VARIABLE} : window.{global} = {ROOT_VARIABLE};\n"
    ));
    body.push_str("})();");
    body
}

/// JavaScript lvalue for `id` relative to the subtree rooted at `top`.
fn binding_target(tree: &UnitTree, top: UnitId, id: UnitId) -> String {
    let mut names = Vec::new();
    let mut current = id;
    while current != top {
        let unit = tree.unit(current);
        names.push(unit.name());
        match unit.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }

    let mut target = String::from(ROOT_VARIABLE);
    for name in names.iter().rev() {
        target.push_str(&member_access(name));
    }
    target
}

/// `.name` for identifier-like names, `["name"]` otherwise.
fn member_access(name: &str) -> String {
    if is_identifier(name) {
        format!(".{name}")
    } else {
        format!("[{}]", js_string_literal(name))
    }
}

/// Whether `name` can be written as a plain JavaScript identifier.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}
