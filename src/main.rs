// Allow common clippy pedantic lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]

//! LinkedIn Pages extractor CLI
//!
//! Command-line interface for running extractions

use clap::Parser;
use linkedin_pages::cli::{exit_code, Cli, Runner};
use tracing::{error, Level};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(exit_code(&e));
    }
}
