//! Gallery configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! [source]
//! location = "https://cdn.example.com/items"
//!
//! [cache]
//! name = "minecraft-items-v1"
//! disk_dir = "/var/cache/gallery"
//!
//! [fetch]
//! content_mode = "archive"
//!
//! [gallery]
//! target = "1.21.4"
//! compression = "deflate"
//! ```

use gallery_archive::Compression;
use gallery_fetch::{
    ContentMode, SourceLayout, DEFAULT_CACHE_NAME, DEFAULT_FETCH_BATCH, DEFAULT_MAX_CAPACITY,
};
use gallery_version::VersionTarget;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default archive name prefix
pub const DEFAULT_ARCHIVE_PREFIX: &str = "minecraft-items";

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Complete gallery configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Where content is published
    pub source: SourceConfig,
    /// Path templates
    pub layout: SourceLayout,
    /// Content cache
    pub cache: CacheConfig,
    /// Fetch behavior
    pub fetch: FetchConfig,
    /// Presentation and export
    pub gallery: ViewConfig,
}

/// `[source]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL (`http(s)://`) or directory
    pub location: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            location: "public".into(),
        }
    }
}

/// `[cache]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Namespace; changing it abandons older entries
    pub name: String,
    /// In-memory entries
    pub max_capacity: u64,
    /// Enables the disk tier under `<disk_dir>/<name>/`
    pub disk_dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_CACHE_NAME.into(),
            max_capacity: DEFAULT_MAX_CAPACITY,
            disk_dir: None,
        }
    }
}

/// `[fetch]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Concurrent fetches per batch
    pub batch_size: usize,
    /// HTTP request timeout
    pub timeout_secs: u64,
    /// Loose images or release archives
    pub content_mode: ContentMode,
}

impl FetchConfig {
    /// Timeout as a duration
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_FETCH_BATCH,
            timeout_secs: 30,
            content_mode: ContentMode::Loose,
        }
    }
}

/// `[gallery]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Items per page
    pub page_size: usize,
    /// Prefix of exported archive names
    pub archive_prefix: String,
    /// Entry compression for exports
    pub compression: Compression,
    /// Version the first view is reconstructed at
    pub target: VersionTarget,
    /// Start with removed items shown
    pub show_removed: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            archive_prefix: DEFAULT_ARCHIVE_PREFIX.into(),
            compression: Compression::Stored,
            target: VersionTarget::Latest,
            show_removed: false,
        }
    }
}

impl GalleryConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML
    ///
    /// # Errors
    /// Returns error if the TOML is malformed or a value is invalid
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// With source location
    #[inline]
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.source.location = location.into();
        self
    }

    /// With content mode
    #[inline]
    #[must_use]
    pub fn with_content_mode(mut self, mode: ContentMode) -> Self {
        self.fetch.content_mode = mode;
        self
    }

    /// With export compression
    #[inline]
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.gallery.compression = compression;
        self
    }

    /// With the version the first view is reconstructed at
    #[inline]
    #[must_use]
    pub fn with_target(mut self, target: VersionTarget) -> Self {
        self.gallery.target = target;
        self
    }

    /// With removed items shown from the first view
    #[inline]
    #[must_use]
    pub fn with_show_removed(mut self, show_removed: bool) -> Self {
        self.gallery.show_removed = show_removed;
        self
    }

    /// Reject values that make no sense
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first bad field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch.batch_size == 0 {
            return Err(ConfigError::invalid("fetch.batch_size", "must be at least 1"));
        }
        if self.gallery.page_size == 0 {
            return Err(ConfigError::invalid("gallery.page_size", "must be at least 1"));
        }
        if self.cache.name.is_empty() || self.cache.name.contains(['/', '\\']) {
            return Err(ConfigError::invalid("cache.name", "must be a plain name"));
        }
        if self.source.location.is_empty() {
            return Err(ConfigError::invalid("source.location", "must not be empty"));
        }
        Ok(())
    }

    /// TOML encoding
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Serialization failed
    #[error("cannot encode config: {0}")]
    Encode(#[from] toml::ser::Error),

    /// A field holds an unusable value
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
