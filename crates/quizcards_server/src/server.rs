//! Process bootstrap.
//!
//! Everything the game reads is loaded before the listener opens: the
//! catalog and images are fetched once, and a failure there aborts startup.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use quizcards::{CHOICES_PER_CARD, MIN_GAME_CARDS};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::{
    AppState, CatalogSource, CookieSettings, ImageCache, ObjectStoreSource, QuizConfig,
    QuizOrchestrator, TokenCodec, build_router, load_catalog,
};

/// Loads the catalog, fills the image cache and assembles handler state.
#[instrument(skip(config, source))]
pub async fn prepare_state(config: &QuizConfig, source: &dyn CatalogSource) -> Result<AppState> {
    let images = ImageCache::new(config.cache_dir());
    images.initialize().await?;

    let catalog = load_catalog(source)
        .await
        .context("Failed to load card catalog")?;
    images
        .prefetch(source, &catalog)
        .await
        .context("Failed to cache card images")?;

    let secret = config
        .session_secret()
        .as_ref()
        .ok_or_else(|| anyhow!("session_secret is required"))?;
    let codec = TokenCodec::new(
        secret.as_bytes(),
        Duration::from_secs(*config.session_max_age_secs()),
    )?;

    let cookie = CookieSettings {
        name: config.cookie_name().clone(),
        max_age_secs: *config.session_max_age_secs(),
        secure: *config.cookie_secure(),
    };

    info!(cards = catalog.len(), "Application initialization complete");
    Ok(AppState {
        orchestrator: Arc::new(QuizOrchestrator::new(Arc::new(catalog), codec)),
        images: Arc::new(images),
        cookie: Arc::new(cookie),
    })
}

/// Serves `state` on the configured address until Ctrl-C.
#[instrument(skip(config, state), fields(host = %config.host(), port = config.port()))]
pub async fn serve(config: &QuizConfig, state: AppState) -> Result<()> {
    let app = build_router(state);
    let addr = format!("{}:{}", config.host(), config.port());

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Server ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Full server lifecycle: build the configured source, prepare, serve.
#[instrument(skip(config))]
pub async fn run(config: QuizConfig) -> Result<()> {
    let source = configured_source(&config)?;
    let state = prepare_state(&config, &source).await?;
    serve(&config, state).await
}

/// Summary of a catalog, for operators.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display(
    "{} cards, {} distinct answers, games of {} to {} cards",
    cards,
    distinct_answers,
    min_game_cards,
    max_game_cards
)]
pub struct CatalogSummary {
    /// Cards in the catalog.
    pub cards: usize,
    /// Distinct answer strings.
    pub distinct_answers: usize,
    /// Smallest allowed game.
    pub min_game_cards: usize,
    /// Largest allowed game.
    pub max_game_cards: usize,
}

/// Loads and validates the configured catalog without serving it.
///
/// Fails when the catalog has fewer than [`CHOICES_PER_CARD`] distinct
/// answers, since no card could then be shown with its choices.
#[instrument(skip(config))]
pub async fn inspect_catalog(config: &QuizConfig) -> Result<CatalogSummary> {
    let source = configured_source(config)?;
    let catalog = load_catalog(&source).await?;

    let distinct_answers = catalog.distinct_answers().len();
    if distinct_answers < CHOICES_PER_CARD {
        bail!(
            "Catalog has {} distinct answers, at least {} are needed to build choices",
            distinct_answers,
            CHOICES_PER_CARD
        );
    }

    Ok(CatalogSummary {
        cards: catalog.len(),
        distinct_answers,
        min_game_cards: MIN_GAME_CARDS,
        max_game_cards: catalog.max_game_size(),
    })
}

fn configured_source(config: &QuizConfig) -> Result<ObjectStoreSource> {
    let catalog = config
        .catalog()
        .as_ref()
        .ok_or_else(|| anyhow!("No catalog source configured"))?;
    Ok(ObjectStoreSource::from_config(catalog)?)
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.ok();
    info!("Received shutdown signal");
}
