//! tmplpack CLI entry point
//!
//! Parses arguments, runs the selected command, and turns any failure into a
//! user-friendly error message and a non-zero exit code.
//!
//! - `build` - Write artifacts into the public directory
//! - `get` - Resolve one request URL
//! - `tree` - Show the unit tree

use anyhow::Result;
use clap::Parser;
use tmplpack::cli;
use tmplpack::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
