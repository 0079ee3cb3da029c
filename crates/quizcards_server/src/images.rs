//! Local cache of card images.
//!
//! Images are downloaded once at startup and served from disk afterwards.

use std::path::{Component, Path, PathBuf};

use axum::body::Bytes;
use quizcards::Catalog;
use tracing::{debug, error, info, instrument, warn};

use crate::CatalogSource;

/// Error raised by the image cache.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ImageError {
    /// The reference is not a plain relative path.
    #[display("Invalid image reference '{}'", _0)]
    InvalidImageRef(String),

    /// No cached image under that reference.
    #[display("Image '{}' not found", _0)]
    NotFound(String),

    /// The cache directory could not be used.
    #[display("Image cache I/O error: {}", _0)]
    Io(String),

    /// Some images could not be downloaded at startup.
    #[display("Failed to download images: {:?}", _0)]
    PrefetchFailed(Vec<String>),
}

impl std::error::Error for ImageError {}

/// Directory of cached card images.
#[derive(Debug, Clone)]
pub struct ImageCache {
    dir: PathBuf,
}

impl ImageCache {
    /// Creates a cache rooted at `dir` (not created until [`Self::initialize`]).
    #[instrument(skip(dir), fields(dir = %dir.as_ref().display()))]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Creates the cache directory if needed.
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub async fn initialize(&self) -> Result<(), ImageError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            error!(error = %e, "Failed to create cache directory");
            ImageError::Io(e.to_string())
        })?;
        info!("Cache directory initialized");
        Ok(())
    }

    /// Returns true if `image_ref` is already cached.
    pub async fn contains(&self, image_ref: &str) -> bool {
        match self.path_for(image_ref) {
            Ok(path) => tokio::fs::metadata(path)
                .await
                .map(|meta| meta.is_file())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Downloads every catalog image that is not cached yet.
    ///
    /// Keeps going after individual failures and reports all of them at
    /// the end. Returns the number of images downloaded.
    #[instrument(skip(self, source, catalog), fields(dir = %self.dir.display(), cards = catalog.len()))]
    pub async fn prefetch(
        &self,
        source: &dyn CatalogSource,
        catalog: &Catalog,
    ) -> Result<usize, ImageError> {
        info!("Downloading card images to cache");
        let mut downloaded = 0;
        let mut failed = Vec::new();

        for card in catalog.cards() {
            let image_ref = card.image_ref();
            if self.contains(image_ref).await {
                debug!(image_ref = %image_ref, "Already cached");
                continue;
            }

            match self.download(source, image_ref).await {
                Ok(()) => downloaded += 1,
                Err(e) => {
                    error!(image_ref = %image_ref, error = %e, "Image download failed");
                    failed.push(image_ref.clone());
                }
            }
        }

        if !failed.is_empty() {
            return Err(ImageError::PrefetchFailed(failed));
        }

        info!(downloaded, "All images cached");
        Ok(downloaded)
    }

    /// Reads a cached image.
    #[instrument(skip(self))]
    pub async fn resolve(&self, image_ref: &str) -> Result<Bytes, ImageError> {
        let path = self.path_for(image_ref)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Image not cached");
                Err(ImageError::NotFound(image_ref.to_string()))
            }
            Err(e) => {
                warn!(error = %e, "Failed to read cached image");
                Err(ImageError::Io(e.to_string()))
            }
        }
    }

    /// MIME type for an image, from its extension.
    pub fn content_type(image_ref: &str) -> &'static str {
        let extension = Path::new(image_ref)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("png") => "image/png",
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            Some("svg") => "image/svg+xml",
            Some("avif") => "image/avif",
            _ => "application/octet-stream",
        }
    }

    async fn download(&self, source: &dyn CatalogSource, image_ref: &str) -> Result<(), ImageError> {
        let path = self.path_for(image_ref)?;
        let bytes = source
            .fetch_image(image_ref)
            .await
            .map_err(|e| ImageError::Io(e.to_string()))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ImageError::Io(e.to_string()))?;
        }
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ImageError::Io(e.to_string()))?;

        debug!(image_ref, bytes = bytes.len(), "Image cached");
        Ok(())
    }

    /// Maps a reference to a path inside the cache, refusing anything that
    /// could escape it.
    fn path_for(&self, image_ref: &str) -> Result<PathBuf, ImageError> {
        let relative = Path::new(image_ref);
        let plain = !image_ref.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !plain {
            warn!(image_ref, "Rejected image reference");
            return Err(ImageError::InvalidImageRef(image_ref.to_string()));
        }
        Ok(self.dir.join(relative))
    }
}
