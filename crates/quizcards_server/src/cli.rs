//! Command-line interface for quizcards.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use quizcards_server::ConfigOverrides;

/// Quizcards - image flashcard quiz server
#[derive(Parser, Debug)]
#[command(name = "quizcards")]
#[command(about = "Browser-playable image flashcard quiz", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the catalog and images, then serve the game over HTTP
    Serve(ServerArgs),

    /// Load and validate the catalog, print a summary and exit
    Catalog(ServerArgs),
}

/// Configuration sources shared by every command.
#[derive(Args, Debug)]
pub struct ServerArgs {
    /// Path to the TOML configuration file (optional)
    #[arg(short, long, default_value = "quizcards.toml")]
    pub config: PathBuf,

    /// Host to bind to
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Secret signing session cookies (at least 32 bytes)
    #[arg(long, env = "SESSION_SECRET_KEY", hide_env_values = true)]
    pub session_secret: Option<String>,

    /// Directory where card images are cached
    #[arg(long, env = "CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// S3 bucket holding the catalog (takes precedence over a local directory)
    #[arg(long, env = "S3_BUCKET_NAME")]
    pub bucket: Option<String>,

    /// AWS region of the bucket
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Key of the catalog JSON
    #[arg(long, env = "S3_CARDS_JSON_KEY")]
    pub cards_key: Option<String>,

    /// Local directory holding the catalog JSON and images
    #[arg(long, env = "LOCAL_CATALOG_DIR")]
    pub local_catalog: Option<PathBuf>,
}

impl ServerArgs {
    /// Values that override the configuration file.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            session_secret: self.session_secret.clone(),
            cache_dir: self.cache_dir.clone(),
            bucket: self.bucket.clone(),
            region: self.region.clone(),
            cards_key: self.cards_key.clone(),
            local_catalog: self.local_catalog.clone(),
        }
    }
}
