//! Content resolution: cache first, then the source
//!
//! # Content modes
//!
//! - [`ContentMode::Loose`]: every image has its own path in the source.
//! - [`ContentMode::Archive`]: images are read out of the release archive of
//!   the version that last touched them; the archive itself is cached under
//!   [`ResourceKey::Archive`].

use crate::cache::ContentCache;
use crate::error::FetchError;
use crate::key::{Blob, ResourceKey};
use crate::layout::SourceLayout;
use crate::source::ResourceSource;
use futures::future::join_all;
use gallery_archive::ArchiveReader;
use gallery_version::VersionId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default number of keys resolved concurrently
pub const DEFAULT_FETCH_BATCH: usize = 10;

/// Where image bytes are read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    /// One path per image
    #[default]
    Loose,
    /// Entries of per-version release archives
    Archive,
}

/// Resolves [`ResourceKey`]s to bytes through a [`ContentCache`]
#[derive(Debug, Clone)]
pub struct ContentResolver {
    source: Arc<dyn ResourceSource>,
    layout: SourceLayout,
    cache: ContentCache,
    mode: ContentMode,
    batch_size: usize,
}

impl ContentResolver {
    /// Resolver in loose mode with the default batch size
    #[must_use]
    pub fn new(source: Arc<dyn ResourceSource>, layout: SourceLayout, cache: ContentCache) -> Self {
        Self {
            source,
            layout,
            cache,
            mode: ContentMode::default(),
            batch_size: DEFAULT_FETCH_BATCH,
        }
    }

    /// Set the content mode
    #[must_use]
    pub fn with_mode(mut self, mode: ContentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set how many keys [`resolve_many`](Self::resolve_many) fetches at once
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Content mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> ContentMode {
        self.mode
    }

    /// Keys fetched per batch
    #[inline]
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Underlying cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Path layout
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &SourceLayout {
        &self.layout
    }

    /// Underlying source
    #[inline]
    #[must_use]
    pub fn source(&self) -> &Arc<dyn ResourceSource> {
        &self.source
    }

    /// Bytes for `key`
    ///
    /// A hit never touches the source. Failures are not cached, so a later
    /// call retries.
    ///
    /// # Errors
    /// Returns [`FetchError::ResourceUnavailable`] for this key
    pub async fn resolve(&self, key: &ResourceKey) -> Result<Blob, FetchError> {
        self.cache
            .get_or_try_load(key, self.load(key))
            .await
            .map_err(|e| (*e).clone())
    }

    /// Resolve `keys` in batches, one result per key in input order
    pub async fn resolve_many(&self, keys: &[ResourceKey]) -> Vec<Result<Blob, FetchError>> {
        let mut results = Vec::with_capacity(keys.len());
        for batch in keys.chunks(self.batch_size) {
            results.extend(join_all(batch.iter().map(|k| self.resolve(k))).await);
        }
        results
    }

    async fn load(&self, key: &ResourceKey) -> Result<Blob, FetchError> {
        match (self.mode, key) {
            (ContentMode::Archive, ResourceKey::Image { version, filename }) => {
                self.extract(key, version, filename).await
            }
            _ => self.fetch_direct(key).await,
        }
    }

    async fn fetch_direct(&self, key: &ResourceKey) -> Result<Blob, FetchError> {
        let path = self.layout.path_for(key);
        tracing::debug!(key = %key, path = %path, "cache miss, fetching");
        match self.source.fetch(&path).await {
            Ok(Some(bytes)) => Ok(Blob::new(bytes)),
            Ok(None) => Err(FetchError::unavailable(
                key.clone(),
                format!("not found at {path}"),
            )),
            Err(e) => Err(FetchError::unavailable(key.clone(), e)),
        }
    }

    async fn extract(
        &self,
        key: &ResourceKey,
        version: &VersionId,
        filename: &str,
    ) -> Result<Blob, FetchError> {
        let archive_key = ResourceKey::archive(version.clone());
        let archive = self
            .cache
            .get_or_try_load(&archive_key, self.fetch_direct(&archive_key))
            .await
            .map_err(|e| FetchError::unavailable(key.clone(), e))?;

        let mut reader = ArchiveReader::new(archive.bytes())
            .map_err(|e| FetchError::unavailable(key.clone(), format!("{archive_key}: {e}")))?;
        match reader.read_by_name(filename) {
            Ok(Some(bytes)) => Ok(Blob::new(bytes)),
            Ok(None) => Err(FetchError::unavailable(
                key.clone(),
                format!("not in {archive_key}"),
            )),
            Err(e) => Err(FetchError::unavailable(key.clone(), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use gallery_archive::{ArchiveWriter, Compression};

    fn v(s: &str) -> VersionId {
        s.parse().unwrap()
    }

    fn resolver(source: &MemorySource) -> ContentResolver {
        ContentResolver::new(
            Arc::new(source.clone()),
            SourceLayout::default(),
            ContentCache::default(),
        )
    }

    #[tokio::test]
    async fn second_resolve_is_a_cache_hit() {
        let source = MemorySource::new();
        source.insert("1.21.4/images/apple.png", b"apple".to_vec());
        let resolver = resolver(&source);
        let key = ResourceKey::image(v("1.21.4"), "apple.png");

        assert_eq!(resolver.resolve(&key).await.unwrap().bytes(), b"apple");
        assert_eq!(resolver.resolve(&key).await.unwrap().bytes(), b"apple");
        assert_eq!(source.fetch_count("1.21.4/images/apple.png"), 1);
    }

    #[tokio::test]
    async fn missing_image_is_unavailable_for_that_key() {
        let source = MemorySource::new();
        let resolver = resolver(&source);
        let key = ResourceKey::image(v("1.21.4"), "ghost.png");
        let err = resolver.resolve(&key).await.unwrap_err();
        assert_eq!(err.key(), &key);
    }

    #[tokio::test]
    async fn failures_retry_on_next_call() {
        let source = MemorySource::new();
        source.insert("1/images/a.png", b"a".to_vec());
        source.fail("1/images/a.png", "connection reset");
        let resolver = resolver(&source);
        let key = ResourceKey::image(v("1"), "a.png");

        assert!(resolver.resolve(&key).await.is_err());
        source.heal("1/images/a.png");
        assert!(resolver.resolve(&key).await.is_ok());
        assert_eq!(source.fetch_count("1/images/a.png"), 2);
    }

    #[tokio::test]
    async fn resolve_many_keeps_input_order() {
        let source = MemorySource::new();
        for name in ["a", "b", "c"] {
            source.insert(format!("1/images/{name}.png"), name.as_bytes().to_vec());
        }
        let resolver = resolver(&source).with_batch_size(2);
        let keys: Vec<_> = ["c", "missing", "a", "b"]
            .iter()
            .map(|n| ResourceKey::image(v("1"), format!("{n}.png")))
            .collect();

        let results = resolver.resolve_many(&keys).await;
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().bytes(), b"c");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap().bytes(), b"a");
        assert_eq!(results[3].as_ref().unwrap().bytes(), b"b");
    }

    #[tokio::test]
    async fn archive_mode_extracts_from_release() {
        let mut writer = ArchiveWriter::new(Compression::Deflate);
        writer.add("apple.png", b"apple").unwrap();
        writer.add("stone.png", b"stone").unwrap();
        let source = MemorySource::new();
        source.insert("releases/minecraft-items-1.21.4.zip", writer.finish().unwrap());

        let resolver = resolver(&source).with_mode(ContentMode::Archive);
        let apple = resolver
            .resolve(&ResourceKey::image(v("1.21.4"), "apple.png"))
            .await
            .unwrap();
        let stone = resolver
            .resolve(&ResourceKey::image(v("1.21.4"), "stone.png"))
            .await
            .unwrap();
        assert_eq!(apple.bytes(), b"apple");
        assert_eq!(stone.bytes(), b"stone");
        assert_eq!(source.fetch_count("releases/minecraft-items-1.21.4.zip"), 1);

        let missing = resolver
            .resolve(&ResourceKey::image(v("1.21.4"), "ghost.png"))
            .await;
        assert!(missing.is_err());
    }
}
