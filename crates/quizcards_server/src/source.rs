//! Catalog sources: where cards and images are fetched from at startup.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use derive_more::{Display, Error};
use object_store::ObjectStore;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use quizcards::{Card, Catalog};
use tracing::{debug, info, instrument, warn};

use crate::CatalogConfig;

/// Origin of the card catalog and its images.
///
/// Consulted once at process start; the game itself never talks to it.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetches every card, in catalog order.
    async fn load(&self) -> Result<Vec<Card>, CatalogLoadError>;

    /// Fetches the raw bytes of one card image.
    async fn fetch_image(&self, image_ref: &str) -> Result<Bytes, CatalogLoadError>;
}

/// Catalog stored in an object store: a JSON array of cards under
/// `cards_key` and the images keyed by their `image_ref`.
#[derive(Debug, Clone)]
pub struct ObjectStoreSource {
    store: Arc<dyn ObjectStore>,
    cards_key: ObjectPath,
}

impl ObjectStoreSource {
    /// Wraps any object store.
    #[instrument(skip(store))]
    pub fn new(store: Arc<dyn ObjectStore>, cards_key: &str) -> Self {
        Self {
            store,
            cards_key: ObjectPath::from(cards_key),
        }
    }

    /// S3 bucket source; credentials and endpoint come from the AWS
    /// environment variables.
    #[instrument]
    pub fn s3(bucket: &str, region: &str, cards_key: &str) -> Result<Self, CatalogLoadError> {
        info!(bucket, region, "Configuring S3 catalog source");
        let store = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_region(region)
            .build()?;
        Ok(Self::new(Arc::new(store), cards_key))
    }

    /// Local directory source.
    #[instrument(skip(root), fields(root = %root.display()))]
    pub fn local(root: &Path, cards_key: &str) -> Result<Self, CatalogLoadError> {
        info!("Configuring local catalog source");
        let store = LocalFileSystem::new_with_prefix(root)?;
        Ok(Self::new(Arc::new(store), cards_key))
    }

    /// Builds the source described by `config`.
    #[instrument(skip(config))]
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogLoadError> {
        match config {
            CatalogConfig::S3 {
                bucket,
                region,
                cards_key,
            } => Self::s3(bucket, region, cards_key),
            CatalogConfig::Local { root, cards_key } => Self::local(root, cards_key),
        }
    }
}

#[async_trait]
impl CatalogSource for ObjectStoreSource {
    #[instrument(skip(self), fields(store = %self.store, key = %self.cards_key))]
    async fn load(&self) -> Result<Vec<Card>, CatalogLoadError> {
        info!("Fetching catalog metadata");
        let bytes = self.store.get(&self.cards_key).await?.bytes().await?;
        let cards: Vec<Card> = serde_json::from_slice(&bytes)?;
        info!(count = cards.len(), "Catalog metadata loaded");
        Ok(cards)
    }

    #[instrument(skip(self), fields(store = %self.store))]
    async fn fetch_image(&self, image_ref: &str) -> Result<Bytes, CatalogLoadError> {
        debug!("Downloading image");
        let location = ObjectPath::parse(image_ref)
            .map_err(|e| CatalogLoadError::new(format!("Invalid image key '{}': {}", image_ref, e)))?;
        let bytes = self.store.get(&location).await?.bytes().await?;
        Ok(bytes)
    }
}

/// Loads and validates the catalog from `source`.
///
/// Failure is fatal to startup.
#[instrument(skip(source))]
pub async fn load_catalog(source: &dyn CatalogSource) -> Result<Catalog, CatalogLoadError> {
    let cards = source.load().await?;
    Catalog::new(cards).map_err(|e| {
        warn!(error = %e, "Catalog failed validation");
        CatalogLoadError::new(format!("Invalid catalog: {}", e))
    })
}

/// Failure to load the catalog or its images.
#[derive(Debug, Clone, Display, Error)]
#[display("Catalog load error: {} at {}:{}", message, file, line)]
pub struct CatalogLoadError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl CatalogLoadError {
    /// Creates a new catalog load error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<object_store::Error> for CatalogLoadError {
    #[track_caller]
    fn from(err: object_store::Error) -> Self {
        Self::new(format!("Object store error: {}", err))
    }
}

impl From<serde_json::Error> for CatalogLoadError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Failed to parse cards JSON: {}", err))
    }
}
