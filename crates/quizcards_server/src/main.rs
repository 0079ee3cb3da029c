//! Quizcards - Unified CLI
//!
//! Image flashcard quiz server with signed-cookie sessions.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command, ServerArgs};
use quizcards_server::QuizConfig;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,quizcards=debug,quizcards_server=debug")),
        )
        .init();

    match cli.command {
        Command::Serve(args) => run_server(args).await,
        Command::Catalog(args) => run_catalog_check(args).await,
    }
}

/// Run the HTTP game server
#[instrument(skip_all, fields(config_path = %args.config.display()))]
async fn run_server(args: ServerArgs) -> Result<()> {
    info!("Starting quizcards server");
    let config = QuizConfig::load(&args.config, args.overrides())?;
    quizcards_server::run(config).await
}

/// Load the catalog and print a summary
#[instrument(skip_all, fields(config_path = %args.config.display()))]
async fn run_catalog_check(args: ServerArgs) -> Result<()> {
    let config = QuizConfig::load(&args.config, args.overrides())?;
    let summary = quizcards_server::inspect_catalog(&config).await?;
    info!(%summary, "Catalog is valid");
    println!("{summary}");
    Ok(())
}
