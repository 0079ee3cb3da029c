//! Server configuration.

use std::path::{Path, PathBuf};

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Shortest accepted session secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Secret used to sign session tokens.
///
/// Never printed: `Debug` is redacted.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionSecret(String);

impl SessionSecret {
    /// Wraps a secret value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionSecret(***)")
    }
}

/// Where the card catalog and its images come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CatalogConfig {
    /// An S3 bucket; credentials come from the standard AWS variables.
    S3 {
        /// Bucket name.
        bucket: String,
        /// AWS region.
        #[serde(default = "default_region")]
        region: String,
        /// Key of the catalog JSON inside the bucket.
        #[serde(default = "default_cards_key")]
        cards_key: String,
    },
    /// A local directory holding the catalog JSON and the images.
    Local {
        /// Directory root.
        root: PathBuf,
        /// Path of the catalog JSON relative to `root`.
        #[serde(default = "default_cards_key")]
        cards_key: String,
    },
}

/// Complete server configuration.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,

    /// Secret signing the session cookie.
    #[serde(default)]
    session_secret: Option<SessionSecret>,

    /// Name of the session cookie.
    #[serde(default = "default_cookie_name")]
    cookie_name: String,

    /// Whether the session cookie is marked `Secure` (HTTPS only).
    #[serde(default)]
    cookie_secure: bool,

    /// Lifetime of a session token, in seconds.
    #[serde(default = "default_session_max_age")]
    session_max_age_secs: u64,

    /// Directory where card images are cached.
    #[serde(default = "default_cache_dir")]
    cache_dir: PathBuf,

    /// Catalog source.
    #[serde(default)]
    catalog: Option<CatalogConfig>,
}

#[instrument]
fn default_host() -> String {
    "0.0.0.0".to_string()
}

#[instrument]
fn default_port() -> u16 {
    8000
}

#[instrument]
fn default_cookie_name() -> String {
    "quiz_session".to_string()
}

#[instrument]
fn default_session_max_age() -> u64 {
    3600
}

#[instrument]
fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache/images")
}

#[instrument]
fn default_region() -> String {
    "us-east-1".to_string()
}

#[instrument]
fn default_cards_key() -> String {
    "cards.json".to_string()
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_secret: None,
            cookie_name: default_cookie_name(),
            cookie_secure: false,
            session_max_age_secs: default_session_max_age(),
            cache_dir: default_cache_dir(),
            catalog: None,
        }
    }
}

/// Values that take precedence over the configuration file.
///
/// Every field left `None` keeps the file (or default) value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Bind address.
    pub host: Option<String>,
    /// Bind port.
    pub port: Option<u16>,
    /// Session signing secret.
    pub session_secret: Option<String>,
    /// Image cache directory.
    pub cache_dir: Option<PathBuf>,
    /// S3 bucket; selects the S3 catalog source.
    pub bucket: Option<String>,
    /// S3 region.
    pub region: Option<String>,
    /// Catalog JSON key.
    pub cards_key: Option<String>,
    /// Local catalog directory; selects the local catalog source.
    pub local_catalog: Option<PathBuf>,
}

impl QuizConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Loads the file at `path` if it exists, otherwise starts from defaults,
    /// then applies `overrides` and validates the result.
    #[instrument(skip(path, overrides), fields(path = %path.display()))]
    pub fn load(path: &Path, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            Self::from_file(path)?
        } else {
            info!("Config file not found at {}, using defaults", path.display());
            Self::default()
        };

        let config = config.with_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Applies `overrides` on top of this configuration.
    ///
    /// A bucket switches the catalog to S3, a local directory switches it to
    /// the local source. Switching kinds starts from the default region and
    /// key; staying on the same kind keeps the file's values. Region and key
    /// overrides then adjust whichever source results.
    #[instrument(skip_all)]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(secret) = overrides.session_secret {
            self.session_secret = Some(SessionSecret::new(secret));
        }
        if let Some(cache_dir) = overrides.cache_dir {
            self.cache_dir = cache_dir;
        }

        if let Some(new_bucket) = overrides.bucket {
            debug!(bucket = %new_bucket, "Using S3 catalog source");
            match &mut self.catalog {
                Some(CatalogConfig::S3 { bucket, .. }) => *bucket = new_bucket,
                _ => {
                    self.catalog = Some(CatalogConfig::S3 {
                        bucket: new_bucket,
                        region: default_region(),
                        cards_key: default_cards_key(),
                    });
                }
            }
        } else if let Some(new_root) = overrides.local_catalog {
            debug!(root = %new_root.display(), "Using local catalog source");
            match &mut self.catalog {
                Some(CatalogConfig::Local { root, .. }) => *root = new_root,
                _ => {
                    self.catalog = Some(CatalogConfig::Local {
                        root: new_root,
                        cards_key: default_cards_key(),
                    });
                }
            }
        }

        match &mut self.catalog {
            Some(CatalogConfig::S3 {
                region, cards_key, ..
            }) => {
                if let Some(new_region) = overrides.region {
                    *region = new_region;
                }
                if let Some(key) = overrides.cards_key {
                    *cards_key = key;
                }
            }
            Some(CatalogConfig::Local { cards_key, .. }) => {
                if let Some(key) = overrides.cards_key {
                    *cards_key = key;
                }
            }
            None => {}
        }

        self
    }

    /// Checks that the configuration can start a server.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the secret is missing or shorter than
    /// [`MIN_SECRET_LEN`] bytes, no catalog source is configured, the cookie
    /// name is empty, or the session lifetime is zero.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.session_secret {
            None => {
                warn!("Session secret missing");
                return Err(ConfigError::new(
                    "session_secret is required (set SESSION_SECRET_KEY)".to_string(),
                ));
            }
            Some(secret) if secret.as_bytes().len() < MIN_SECRET_LEN => {
                warn!(len = secret.as_bytes().len(), "Session secret too short");
                return Err(ConfigError::new(format!(
                    "session_secret must be at least {} bytes",
                    MIN_SECRET_LEN
                )));
            }
            Some(_) => {}
        }

        if self.catalog.is_none() {
            return Err(ConfigError::new(
                "No catalog source configured (set S3_BUCKET_NAME or LOCAL_CATALOG_DIR)".to_string(),
            ));
        }
        if self.cookie_name.is_empty() {
            return Err(ConfigError::new("cookie_name must not be empty".to_string()));
        }
        if self.session_max_age_secs == 0 {
            return Err(ConfigError::new(
                "session_max_age_secs must be positive".to_string(),
            ));
        }

        debug!("Config validated");
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
