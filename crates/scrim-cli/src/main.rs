//! Scrim CLI application
//!
//! Operator front end for evaluation sessions: build a run configuration
//! from an agent prompt, launch the simulation engine, and inspect the
//! scored scenarios it produces.
//!
//! # Installation
//!
//! ```bash
//! cargo install --path crates/scrim-cli
//! ```

mod args;
mod commands;
mod console;
mod router;

use args::{Cli, LogFormat};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    router::route(cli).await
}

/// Logs go to stderr; RUST_LOG takes precedence over --verbose
fn init_logging(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
