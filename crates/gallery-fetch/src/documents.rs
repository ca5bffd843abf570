//! JSON documents: catalog, base manifests and changesets
//!
//! Documents are read through the same [`ResourceSource`] as images and
//! memoized per path for the lifetime of the store, including "not
//! published" answers. Failed fetches are not memoized.

use crate::error::SourceError;
use crate::layout::SourceLayout;
use crate::source::ResourceSource;
use async_trait::async_trait;
use gallery_changeset::{Changeset, ChangesetProvider, Manifest, ProviderError};
use gallery_version::{release_version, Catalog, CatalogError, VersionId};
use moka::future::Cache;
use std::sync::Arc;

const MEMO_CAPACITY: u64 = 1_024;

/// Memoizing reader for gallery documents
#[derive(Debug, Clone)]
pub struct DocumentStore {
    source: Arc<dyn ResourceSource>,
    layout: SourceLayout,
    memo: Cache<String, Option<Arc<[u8]>>>,
}

impl DocumentStore {
    /// Store reading from `source` at the paths `layout` gives
    #[must_use]
    pub fn new(source: Arc<dyn ResourceSource>, layout: SourceLayout) -> Self {
        Self {
            source,
            layout,
            memo: Cache::new(MEMO_CAPACITY),
        }
    }

    /// Path layout
    #[inline]
    #[must_use]
    pub fn layout(&self) -> &SourceLayout {
        &self.layout
    }

    /// Raw document at `path`, fetched at most once while it succeeds
    ///
    /// # Errors
    /// Returns error if the source fails
    pub async fn document(&self, path: &str) -> Result<Option<Arc<[u8]>>, SourceError> {
        self.memo
            .try_get_with_by_ref(path, self.source.fetch(path))
            .await
            .map_err(|e| (*e).clone())
    }

    /// Load the version catalog
    ///
    /// Without a catalog document, release archives listed by the source
    /// are used instead, with the earliest release as base.
    ///
    /// # Errors
    /// Returns [`CatalogError::Unavailable`] if neither the document nor a
    /// release listing can be obtained, or [`CatalogError::Malformed`] if
    /// the document does not parse
    pub async fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        let path = self.layout.catalog_path();
        match self.document(path).await {
            Ok(Some(bytes)) => {
                let catalog = Catalog::from_json(&bytes)?;
                tracing::info!(
                    versions = catalog.versions().len(),
                    base = %catalog.base(),
                    "catalog loaded"
                );
                Ok(catalog)
            }
            Ok(None) => {
                tracing::debug!(path, "no catalog document, listing releases");
                self.catalog_from_releases()
                    .await?
                    .ok_or_else(|| CatalogError::Unavailable(format!("{path} not found")))
            }
            Err(e) => Err(CatalogError::Unavailable(e.to_string())),
        }
    }

    async fn catalog_from_releases(&self) -> Result<Option<Catalog>, CatalogError> {
        let Some((dir, prefix)) = self.layout.release_listing() else {
            return Ok(None);
        };
        let names = match self.source.list(dir).await {
            Ok(Some(names)) => names,
            Ok(None) => return Ok(None),
            Err(e) => return Err(CatalogError::Unavailable(e.to_string())),
        };
        let Some(base) = names.iter().filter_map(|n| release_version(n, prefix)).min() else {
            return Ok(None);
        };
        let catalog = Catalog::from_release_names(&names, prefix, base);
        tracing::info!(
            versions = catalog.versions().len(),
            base = %catalog.base(),
            "catalog built from release listing"
        );
        Ok(Some(catalog))
    }
}

#[async_trait]
impl ChangesetProvider for DocumentStore {
    async fn base_manifest(&self, base: &VersionId) -> Result<Manifest, ProviderError> {
        let path = self.layout.manifest_path(base);
        let bytes = self
            .document(&path)
            .await
            .map_err(|e| ProviderError::Transport {
                path: path.clone(),
                reason: e.to_string(),
            })?
            .ok_or_else(|| ProviderError::NotFound(path.clone()))?;
        Manifest::from_json(&bytes).map_err(|e| ProviderError::Malformed {
            path,
            reason: e.to_string(),
        })
    }

    async fn changeset(&self, version: &VersionId) -> Result<Option<Changeset>, ProviderError> {
        let path = self.layout.changeset_path(version);
        let Some(bytes) = self
            .document(&path)
            .await
            .map_err(|e| ProviderError::Transport {
                path: path.clone(),
                reason: e.to_string(),
            })?
        else {
            return Ok(None);
        };
        Changeset::from_json(&bytes)
            .map(Some)
            .map_err(|e| ProviderError::Malformed {
                path,
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn v(s: &str) -> VersionId {
        s.parse().unwrap()
    }

    fn store(source: &MemorySource) -> DocumentStore {
        DocumentStore::new(Arc::new(source.clone()), SourceLayout::default())
    }

    #[tokio::test]
    async fn catalog_document_preferred() {
        let source = MemorySource::new();
        source.insert(
            "versions.json",
            br#"{"versions":["1.21.5","1.21.4"],"base":"1.21.4"}"#.to_vec(),
        );
        let catalog = store(&source).load_catalog().await.unwrap();
        assert_eq!(catalog.versions(), &[v("1.21.4"), v("1.21.5")]);
        assert_eq!(catalog.base(), &v("1.21.4"));
    }

    #[tokio::test]
    async fn catalog_from_release_listing() {
        let source = MemorySource::new();
        source.insert("releases/minecraft-items-1.21.5.zip", Vec::<u8>::new());
        source.insert("releases/minecraft-items-1.21.4.zip", Vec::<u8>::new());
        source.insert("releases/readme.txt", Vec::<u8>::new());
        let catalog = store(&source).load_catalog().await.unwrap();
        assert_eq!(catalog.versions(), &[v("1.21.4"), v("1.21.5")]);
        assert_eq!(catalog.base(), &v("1.21.4"));
    }

    #[tokio::test]
    async fn catalog_unavailable() {
        let source = MemorySource::new();
        let err = store(&source).load_catalog().await.unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable(_)));

        source.fail("versions.json", "503");
        let err = store(&source).load_catalog().await.unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable(_)));
    }

    #[tokio::test]
    async fn malformed_catalog_reported() {
        let source = MemorySource::new();
        source.insert("versions.json", b"not json".to_vec());
        let err = store(&source).load_catalog().await.unwrap_err();
        assert!(matches!(err, CatalogError::Malformed(_)));
    }

    #[tokio::test]
    async fn documents_fetched_once() {
        let source = MemorySource::new();
        source.insert("1.21.5/changes.json", br#"{"added":["b.png"]}"#.to_vec());
        let store = store(&source);

        for _ in 0..3 {
            let cs = store.changeset(&v("1.21.5")).await.unwrap().unwrap();
            assert_eq!(cs.added, vec!["b.png"]);
            assert!(store.changeset(&v("1.21.6")).await.unwrap().is_none());
        }
        assert_eq!(source.fetch_count("1.21.5/changes.json"), 1);
        assert_eq!(source.fetch_count("1.21.6/changes.json"), 1);
    }

    #[tokio::test]
    async fn provider_errors_classified() {
        let source = MemorySource::new();
        source.insert("1.21.5/changes.json", b"{".to_vec());
        source.fail("1.21.6/changes.json", "timeout");
        let store = store(&source);

        assert!(matches!(
            store.base_manifest(&v("1.21.4")).await,
            Err(ProviderError::NotFound(_))
        ));
        assert!(matches!(
            store.changeset(&v("1.21.5")).await,
            Err(ProviderError::Malformed { .. })
        ));
        assert!(matches!(
            store.changeset(&v("1.21.6")).await,
            Err(ProviderError::Transport { .. })
        ));
    }
}
