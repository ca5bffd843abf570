//! Keyed content cache using moka, with an optional disk tier
//!
//! Memory entries are keyed by [`ResourceKey`]; the disk tier stores one
//! file per key under `<disk_dir>/<name>/`. Concurrent misses for one key
//! share a single load. Entries are never invalidated; a new namespace
//! name starts a fresh cache.

use crate::key::{Blob, ResourceKey};
use moka::future::Cache;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default cache namespace
pub const DEFAULT_CACHE_NAME: &str = "minecraft-items-v1";

/// Default number of in-memory entries
pub const DEFAULT_MAX_CAPACITY: u64 = 10_000;

/// Content cache keyed by resource identity
#[derive(Debug, Clone)]
pub struct ContentCache {
    name: String,
    inner: Cache<ResourceKey, Blob>,
    disk_dir: Option<PathBuf>,
}

impl ContentCache {
    /// Memory-only cache named `name` holding up to `max_capacity` entries
    #[must_use]
    pub fn new(name: impl Into<String>, max_capacity: u64) -> Self {
        Self {
            name: name.into(),
            inner: Cache::new(max_capacity),
            disk_dir: None,
        }
    }

    /// Persist entries under `<dir>/<name>/`
    #[must_use]
    pub fn with_disk_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.disk_dir = Some(dir.as_ref().join(&self.name));
        self
    }

    /// Cache namespace
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory of the disk tier, if enabled
    #[inline]
    #[must_use]
    pub fn disk_dir(&self) -> Option<&Path> {
        self.disk_dir.as_deref()
    }

    /// Cached blob for `key` from memory, then disk
    pub async fn get(&self, key: &ResourceKey) -> Option<Blob> {
        if let Some(blob) = self.inner.get(key).await {
            return Some(blob);
        }
        let blob = self.read_disk(key).await?;
        self.inner.insert(key.clone(), blob.clone()).await;
        Some(blob)
    }

    /// Store `blob` under `key` in every tier
    pub async fn insert(&self, key: ResourceKey, blob: Blob) {
        self.write_disk(&key, &blob).await;
        self.inner.insert(key, blob).await;
    }

    /// Cached blob for `key`, or the result of `load` stored under `key`
    ///
    /// Concurrent callers missing the same key await one `load`. Errors are
    /// shared with those callers and not cached.
    ///
    /// # Errors
    /// Returns the error from `load`
    pub async fn get_or_try_load<F, E>(&self, key: &ResourceKey, load: F) -> Result<Blob, Arc<E>>
    where
        F: Future<Output = Result<Blob, E>>,
        E: Send + Sync + 'static,
    {
        self.inner
            .try_get_with_by_ref(key, async {
                if let Some(blob) = self.read_disk(key).await {
                    return Ok(blob);
                }
                let blob = load.await?;
                self.write_disk(key, &blob).await;
                Ok(blob)
            })
            .await
    }

    /// Whether `key` is in memory
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.inner.contains_key(key)
    }

    fn disk_path(&self, key: &ResourceKey) -> Option<PathBuf> {
        self.disk_dir.as_ref().map(|dir| dir.join(key.disk_name()))
    }

    async fn read_disk(&self, key: &ResourceKey) -> Option<Blob> {
        let path = self.disk_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                tracing::trace!(key = %key, "disk cache hit");
                Some(Blob::new(bytes))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "disk cache read failed");
                None
            }
        }
    }

    async fn write_disk(&self, key: &ResourceKey, blob: &Blob) {
        let Some(path) = self.disk_path(key) else {
            return;
        };
        let result = async {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            // write-then-rename so readers never see a partial file
            let tmp = path.with_extension("part");
            tokio::fs::write(&tmp, blob.bytes()).await?;
            tokio::fs::rename(&tmp, &path).await
        }
        .await;
        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "disk cache write failed");
        }
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_NAME, DEFAULT_MAX_CAPACITY)
    }
}
