//! Run one request through the service.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::config::BundleConfig;
use crate::service::{Outcome, TemplateService};

/// Command that resolves a request URL the way a host server would.
///
/// Prints the artifact body for inline outcomes (nothing for `HEAD`), the
/// artifact path for stored outcomes, and a note on stderr for pass-through.
#[derive(Args, Debug)]
pub struct GetCommand {
    /// Request URL, such as `/templates/emails.js`
    url: String,

    /// HTTP method to simulate
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,
}

impl GetCommand {
    pub async fn execute(self, config: BundleConfig) -> Result<()> {
        let method = self.method.to_ascii_uppercase();
        let url = self.url.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            let service = TemplateService::new(config)?;
            service.handle(&method, &url)
        })
        .await
        .context("Request task failed")??;

        match outcome {
            Outcome::PassThrough => {
                eprintln!("{} {} is not handled by tmplpack", "pass-through".yellow(), self.url);
            }
            Outcome::Stored { path, action } => {
                eprintln!("{} {}", action.to_string().as_str().dimmed(), path.display());
                println!("{}", path.display());
            }
            Outcome::Inline { artifact, action } => {
                eprintln!(
                    "{} {} ({})",
                    action.to_string().as_str().dimmed(),
                    artifact.content_type(),
                    artifact.body().len()
                );
                if !self.method.eq_ignore_ascii_case("HEAD") {
                    println!("{}", artifact.body());
                }
            }
        }

        Ok(())
    }
}
