//! Common test utilities for tmplpack integration tests

// Not every helper is used by every test module
#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;

use tmplpack::service::Outcome;

/// Builds a `tmplpack` command running in `dir`, with logging and colors off.
pub fn tmplpack_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tmplpack").expect("tmplpack binary should be built");
    cmd.current_dir(dir).env_remove("RUST_LOG").env_remove("TMPLPACK_CONFIG").arg("--no-color");
    cmd
}

/// Left-hand sides of the `T... = ` binding lines in an artifact, in order.
pub fn bindings(body: &str) -> Vec<String> {
    body.lines()
        .filter(|line| line.starts_with("T ") || line.starts_with("T.") || line.starts_with("T["))
        .filter_map(|line| line.split(" = ").next())
        .map(str::to_string)
        .collect()
}

/// Body of an inline outcome.
pub fn inline_body(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Inline { artifact, .. } => artifact.body().to_string(),
        other => panic!("expected an inline artifact, got {other:?}"),
    }
}

/// Path of a stored outcome.
pub fn stored_path(outcome: &Outcome) -> std::path::PathBuf {
    match outcome {
        Outcome::Stored { path, .. } => path.clone(),
        other => panic!("expected a stored artifact, got {other:?}"),
    }
}
