//! Display the unit tree.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Args;
use colored::Colorize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::BundleConfig;
use crate::service::TemplateService;
use crate::tree::{UnitId, UnitOrigin, UnitTree};

/// Command to show the unit tree built from the source directory.
///
/// ```text
/// <root>                           2026-03-02 10:14:07
/// ├── emails      directory        2026-03-02 10:14:07
/// │   └── welcome file             2026-03-02 10:14:07
/// └── layout      file             2026-02-11 08:00:51
///     └── Footer  block            2026-02-11 08:00:51
/// ```
#[derive(Args, Debug)]
pub struct TreeCommand {
    /// Show the source path of every unit
    #[arg(long)]
    paths: bool,
}

impl TreeCommand {
    pub async fn execute(self, config: BundleConfig) -> Result<()> {
        let service = tokio::task::spawn_blocking(move || TemplateService::new(config))
            .await
            .context("Tree build task failed")??;
        let tree = service.tree();

        print!("{}", self.render(&tree));
        Ok(())
    }

    fn render(&self, tree: &UnitTree) -> String {
        let root = tree.root();
        let mut out = format!("{}  {}\n", "<root>".bold(), format_time(tree.effective_freshness(root)));
        let children = tree.unit(root).children();
        for (index, &child) in children.iter().enumerate() {
            self.render_unit(tree, child, "", index + 1 == children.len(), &mut out);
        }
        out
    }

    fn render_unit(&self, tree: &UnitTree, id: UnitId, prefix: &str, last: bool, out: &mut String) {
        let unit = tree.unit(id);
        let branch = if last { "└── " } else { "├── " };
        let kind = match unit.origin() {
            UnitOrigin::Block { .. } => unit.origin().kind().cyan(),
            UnitOrigin::Placeholder(_) => unit.origin().kind().yellow(),
            _ => unit.origin().kind().normal(),
        };

        out.push_str(&format!(
            "{prefix}{branch}{}  {}  {}",
            unit.name().bold(),
            kind,
            format_time(tree.effective_freshness(id)).as_str().dimmed()
        ));
        if self.paths {
            out.push_str(&format!("  {}", unit.origin().path().display()));
        }
        out.push('\n');

        let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
        let children = unit.children();
        for (index, &child) in children.iter().enumerate() {
            self.render_unit(tree, child, &child_prefix, index + 1 == children.len(), out);
        }
    }
}

fn format_time(time: SystemTime) -> String {
    if time == UNIX_EPOCH {
        return "-".to_string();
    }
    DateTime::<Local>::from(time).format("%Y-%m-%d %H:%M:%S").to_string()
}
