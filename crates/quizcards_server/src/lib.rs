//! Quizcards server - browser-playable flashcard quiz
//!
//! Wraps the pure game logic of [`quizcards`] in an HTTP service.
//!
//! # Architecture
//!
//! - **Source**: fetches the card catalog and images once at startup
//!   (S3 or a local directory, through `object_store`)
//! - **Images**: local cache the images are served from
//! - **Token**: HMAC-signed session token carried in a cookie
//! - **Orchestrator**: one game transition per request, no server-side
//!   session store
//! - **Routes**: axum JSON API plus the embedded browser frontend
//!
//! # Example
//!
//! ```no_run
//! use quizcards_server::{ConfigOverrides, QuizConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = QuizConfig::load(
//!     std::path::Path::new("quizcards.toml"),
//!     ConfigOverrides::default(),
//! )?;
//! quizcards_server::run(config).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod images;
mod orchestrator;
mod routes;
mod server;
mod source;
mod token;

/// Request and response bodies of the HTTP API.
pub mod api;

// Crate-level exports - Configuration
pub use config::{
    CatalogConfig, ConfigError, ConfigOverrides, MIN_SECRET_LEN, QuizConfig, SessionSecret,
};

// Crate-level exports - Catalog source and images
pub use images::{ImageCache, ImageError};
pub use source::{CatalogLoadError, CatalogSource, ObjectStoreSource, load_catalog};

// Crate-level exports - Sessions
pub use token::{TokenCodec, TokenError};

// Crate-level exports - Orchestration and HTTP
pub use orchestrator::{ApiError, QuizOrchestrator, image_url};
pub use routes::{AppState, CookieSettings, build_router};

// Crate-level exports - Bootstrap
pub use server::{CatalogSummary, inspect_catalog, prepare_state, run, serve};
