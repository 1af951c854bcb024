//! Write artifacts into the public directory.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::sync::Arc;

use crate::artifact::Action;
use crate::config::BundleConfig;
use crate::service::{Outcome, TemplateService};
use crate::tree::KeyPath;

/// Command to build artifacts ahead of time.
///
/// Each key path is served concurrently through the same gate a host server
/// uses, so artifacts that are already current are left alone.
///
/// # Examples
///
/// ```bash
/// tmplpack build                  # the whole tree
/// tmplpack build emails layout    # two subtrees
/// tmplpack build --force          # ignore freshness
/// ```
#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Key paths to build, such as `emails/welcome` (default: the whole tree)
    #[arg(value_name = "KEY_PATH")]
    key_paths: Vec<String>,

    /// Rebuild even when the stored artifact is current
    #[arg(short, long)]
    force: bool,
}

impl BuildCommand {
    pub async fn execute(self, config: BundleConfig) -> Result<()> {
        if config.public.is_none() {
            anyhow::bail!(
                "`build` writes artifacts to disk: set `public` in tmplpack.toml or pass --public"
            );
        }
        let config = if self.force {
            config.with_reload(true)
        } else {
            config
        };

        let service = Arc::new(
            tokio::task::spawn_blocking(move || TemplateService::new(config))
                .await
                .context("Tree build task failed")??,
        );

        let key_paths: Vec<KeyPath> = if self.key_paths.is_empty() {
            vec![KeyPath::root()]
        } else {
            self.key_paths.iter().map(|path| KeyPath::parse(path)).collect()
        };

        let tasks = key_paths.into_iter().map(|key_path| {
            let service = Arc::clone(&service);
            async move {
                tokio::task::spawn_blocking(move || {
                    let outcome = service.serve(&key_path).map_err(|error| {
                        super::with_key_path_suggestions(error, &service.tree())
                    })?;
                    Ok::<_, anyhow::Error>((key_path, outcome))
                })
                .await
                .context("Artifact build task failed")?
            }
        });
        let results = futures::future::try_join_all(tasks).await?;

        let mut rebuilt = 0;
        for (key_path, outcome) in &results {
            let Outcome::Stored { path, action } = outcome else {
                continue;
            };
            let label = if key_path.is_root() {
                "<root>".to_string()
            } else {
                key_path.to_string()
            };
            match action {
                Action::Rebuild => {
                    rebuilt += 1;
                    println!("{} {} -> {}", "rebuilt".green(), label.as_str().bold(), path.display());
                }
                Action::Reuse => {
                    println!("{} {} -> {}", "reused".dimmed(), label, path.display());
                }
            }
        }

        println!("{} of {} artifacts rebuilt", rebuilt, results.len());
        Ok(())
    }
}
