//! Error types for the gallery session
//!
//! Severity differs per variant:
//! - `CatalogUnavailable` degrades the session to the fallback catalog
//! - `BaseManifestMissing` fails one reconstruction; the previous view stays
//! - `ChangesetUnavailable` and `ResourceUnavailable` skip one unit of work
//! - `EmptyArchive` fails one export

use crate::config::ConfigError;
use crate::export::ExportError;
use gallery_archive::ArchiveError;
use gallery_changeset::{ProviderError, ReconstructError};
use gallery_fetch::{FetchError, ResourceKey, SourceError};
use gallery_version::{CatalogError, VersionId};

/// Main gallery error type
#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    /// Catalog could not be loaded or parsed
    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(#[from] CatalogError),

    /// No base snapshot to reconstruct from
    #[error("base manifest for {version} missing: {source}")]
    BaseManifestMissing {
        version: VersionId,
        #[source]
        source: ProviderError,
    },

    /// One version's changeset could not be used
    #[error("changeset for {version} unavailable: {source}")]
    ChangesetUnavailable {
        version: VersionId,
        #[source]
        source: ProviderError,
    },

    /// Content for one key could not be obtained
    #[error("resource unavailable: {key}: {reason}")]
    ResourceUnavailable { key: ResourceKey, reason: String },

    /// Export produced no entries
    #[error("archive would be empty: none of {requested} item(s) could be exported")]
    EmptyArchive { requested: usize },

    /// Archive could not be written
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// Configuration could not be used
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Source could not be set up
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Name is not part of the current view
    #[error("unknown item: '{0}'")]
    UnknownItem(String),
}

impl GalleryError {
    /// Whether the session keeps working after this error
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::Source(_))
    }
}

impl From<ReconstructError> for GalleryError {
    fn from(err: ReconstructError) -> Self {
        match err {
            ReconstructError::BaseManifestMissing { version, source } => {
                Self::BaseManifestMissing { version, source }
            }
            ReconstructError::ChangesetUnavailable { version, source } => {
                Self::ChangesetUnavailable { version, source }
            }
        }
    }
}

impl From<ExportError> for GalleryError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::EmptyArchive { requested } => Self::EmptyArchive { requested },
            ExportError::Archive(e) => Self::Archive(e),
        }
    }
}

impl From<FetchError> for GalleryError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::ResourceUnavailable { key, reason } => {
                Self::ResourceUnavailable { key, reason }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconstruct_errors_map_one_to_one() {
        let err: GalleryError = ReconstructError::BaseManifestMissing {
            version: "1.21.4".parse().unwrap(),
            source: ProviderError::NotFound("1.21.4/manifest.json".into()),
        }
        .into();
        assert!(matches!(err, GalleryError::BaseManifestMissing { .. }));
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("1.21.4"));
    }

    #[test]
    fn fetch_errors_keep_key() {
        let key = ResourceKey::image("1.21".parse().unwrap(), "a.png");
        let err: GalleryError = FetchError::unavailable(key.clone(), "404").into();
        assert!(matches!(err, GalleryError::ResourceUnavailable { key: k, .. } if k == key));
    }
}
