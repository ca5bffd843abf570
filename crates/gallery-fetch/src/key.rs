//! Cache keys and cached content

use gallery_changeset::ContentHash;
use gallery_version::VersionId;
use std::fmt::{self, Display};
use std::sync::Arc;

/// Identity of one fetchable resource
///
/// Equality follows [`VersionId`], so `1.21` and `1.21.0` share entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    /// One image as of the version that last touched it
    Image { version: VersionId, filename: String },
    /// Release archive of a version
    Archive { version: VersionId },
}

impl ResourceKey {
    /// Image key
    #[inline]
    #[must_use]
    pub fn image(version: VersionId, filename: impl Into<String>) -> Self {
        Self::Image {
            version,
            filename: filename.into(),
        }
    }

    /// Archive key
    #[inline]
    #[must_use]
    pub fn archive(version: VersionId) -> Self {
        Self::Archive { version }
    }

    /// Version component
    #[inline]
    #[must_use]
    pub fn version(&self) -> &VersionId {
        match self {
            Self::Image { version, .. } | Self::Archive { version } => version,
        }
    }

    /// Stable name for the disk tier, safe as a single path segment
    pub(crate) fn disk_name(&self) -> String {
        let hash = ContentHash::compute(self.to_string().as_bytes());
        let suffix = match self {
            Self::Image { .. } => "img",
            Self::Archive { .. } => "zip",
        };
        format!("{hash}.{suffix}")
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image { version, filename } => {
                write!(f, "image:{}/{filename}", version.normalized_string())
            }
            Self::Archive { version } => write!(f, "archive:{}", version.normalized_string()),
        }
    }
}

/// Fetched bytes plus their content hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Arc<[u8]>,
    hash: ContentHash,
}

impl Blob {
    /// Wrap `bytes`, hashing them
    #[must_use]
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        let hash = ContentHash::compute(&bytes);
        Self { bytes, hash }
    }

    /// Raw bytes
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the bytes
    #[inline]
    #[must_use]
    pub fn shared(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    /// blake3 hash of the bytes
    #[inline]
    #[must_use]
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    /// Byte length
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Zero bytes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
