//! Asynchronous reconstruction over a changeset provider
//!
//! Loads the base manifest, fetches the changesets on the catalog path in
//! bounded batches and replays them in ascending version order.

use crate::document::{Changeset, Manifest};
use crate::replay::{Reconstruction, Replay, SkippedVersion};
use async_trait::async_trait;
use futures::future::join_all;
use gallery_version::{Catalog, VersionId, VersionTarget};

/// Default number of changesets fetched concurrently
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Source of base manifests and changesets
#[async_trait]
pub trait ChangesetProvider: Send + Sync {
    /// Base manifest for `base`
    ///
    /// # Errors
    /// Returns error if the manifest cannot be retrieved or parsed
    async fn base_manifest(&self, base: &VersionId) -> Result<Manifest, ProviderError>;

    /// Changeset for `version`; `Ok(None)` means none was published
    ///
    /// # Errors
    /// Returns error if the changeset exists but cannot be retrieved or parsed
    async fn changeset(&self, version: &VersionId) -> Result<Option<Changeset>, ProviderError>;
}

/// Errors raised by a [`ChangesetProvider`]
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// Document does not exist
    #[error("document not found: {0}")]
    NotFound(String),

    /// Transport or I/O failure
    #[error("failed to fetch {path}: {reason}")]
    Transport { path: String, reason: String },

    /// Document is not valid JSON of the expected shape
    #[error("malformed document {path}: {reason}")]
    Malformed { path: String, reason: String },
}

/// Errors during reconstruction
#[derive(Debug, thiserror::Error)]
pub enum ReconstructError {
    /// No usable base snapshot; fatal
    #[error("base manifest for {version} missing: {source}")]
    BaseManifestMissing {
        version: VersionId,
        #[source]
        source: ProviderError,
    },

    /// One version's changeset could not be used; reconstruction continues
    #[error("changeset for {version} unavailable: {source}")]
    ChangesetUnavailable {
        version: VersionId,
        #[source]
        source: ProviderError,
    },
}

/// Replays base manifest and changesets up to a target version
#[derive(Debug, Clone, Copy)]
pub struct Reconstructor {
    batch_size: usize,
}

impl Reconstructor {
    /// Create reconstructor fetching `batch_size` changesets at a time
    #[inline]
    #[must_use]
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Changesets fetched per batch
    #[inline]
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Reconstruct the view at `target`
    ///
    /// Unavailable changesets are logged, recorded in
    /// [`Reconstruction::skipped`] and treated as empty.
    ///
    /// # Errors
    /// Returns [`ReconstructError::BaseManifestMissing`] if the base manifest
    /// cannot be loaded
    pub async fn reconstruct<P>(
        &self,
        provider: &P,
        catalog: &Catalog,
        target: &VersionTarget,
        show_removed: bool,
    ) -> Result<Reconstruction, ReconstructError>
    where
        P: ChangesetProvider + ?Sized,
    {
        let base = catalog.base().clone();
        let manifest = provider.base_manifest(&base).await.map_err(|source| {
            ReconstructError::BaseManifestMissing {
                version: base.clone(),
                source,
            }
        })?;

        let path = catalog.path_to(target);
        tracing::info!(
            checkpoint = %target,
            base = %base,
            base_items = manifest.images.len(),
            versions = path.len(),
            show_removed,
            "reconstructing"
        );

        let mut replay = Replay::from_base(base, &manifest, show_removed);
        let mut skipped = Vec::new();

        for batch in path.chunks(self.batch_size) {
            let fetched = join_all(batch.iter().map(|v| provider.changeset(v))).await;

            for (version, result) in batch.iter().zip(fetched) {
                match result {
                    Ok(Some(changeset)) => replay.apply(version, &changeset),
                    Ok(None) => {
                        tracing::debug!(version = %version, "no changeset published");
                        replay.apply(version, &Changeset::default());
                    }
                    Err(source) => {
                        let reason = source.to_string();
                        let err = ReconstructError::ChangesetUnavailable {
                            version: version.clone(),
                            source,
                        };
                        tracing::warn!(error = %err, "skipping version");
                        skipped.push(SkippedVersion {
                            version: version.clone(),
                            reason,
                        });
                    }
                }
            }
        }

        let reconstruction = replay.finish(target.clone(), skipped);
        tracing::info!(
            checkpoint = %target,
            items = reconstruction.len(),
            removed = reconstruction.removed().len(),
            skipped = reconstruction.skipped().len(),
            "reconstruction complete"
        );
        Ok(reconstruction)
    }
}

impl Default for Reconstructor {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}
