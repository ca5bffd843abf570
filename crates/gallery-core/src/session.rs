//! Gallery session: the current view and everything the user does with it
//!
//! # Overlapping requests
//!
//! Every `set_target` / `set_show_removed` call takes the next generation
//! number before reconstructing. A finished reconstruction is committed only
//! if its generation is still the newest; otherwise it is discarded and the
//! call returns [`ReconstructOutcome::Superseded`]. Requests compose: a
//! `set_show_removed` issued while a `set_target` is in flight uses the
//! newly requested target.

use crate::config::GalleryConfig;
use crate::error::GalleryError;
use crate::export::{ArchiveName, ExportScope, ExportedArchive, Exporter, ProgressTracker};
use crate::paginator::{Cursor, Paginator};
use crate::projection::{display_name, project, SortMode};
use crate::selection::Selection;
use gallery_changeset::{Reconstruction, Reconstructor};
use gallery_fetch::{
    source_for_location, Blob, ContentCache, ContentResolver, DocumentStore, ResourceKey,
    ResourceSource,
};
use gallery_version::{Catalog, VersionId, VersionTarget};
use parking_lot::RwLock;
use std::sync::Arc;

/// Result of a target or visibility change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconstructOutcome {
    /// New view committed
    Applied {
        /// Selected names no longer present
        pruned: Vec<String>,
        /// Versions whose changesets were skipped
        skipped_versions: Vec<VersionId>,
    },
    /// A newer request was issued first; this result was discarded
    Superseded,
}

/// One item on a page
#[derive(Debug, Clone)]
pub struct PageItem {
    /// Filename
    pub filename: String,
    /// Human-readable name
    pub display_name: String,
    /// Version the content comes from
    pub version: VersionId,
    /// Shown only because removed items are visible
    pub removed: bool,
    /// In the current selection
    pub selected: bool,
    /// Image bytes; `None` renders as a placeholder
    pub content: Option<Blob>,
}

/// One page of the visible items
#[derive(Debug, Clone)]
pub struct Page {
    /// Items in display order
    pub items: Vec<PageItem>,
    /// Cursor of the following page
    pub next: Option<Cursor>,
    /// Visible items across all pages
    pub total: usize,
}

/// Exported archive with its file name
#[derive(Debug, Clone)]
pub struct NamedArchive {
    /// File name derived from target and scope
    pub name: ArchiveName,
    /// Archive contents
    pub archive: ExportedArchive,
}

impl NamedArchive {
    /// File name, e.g. `minecraft-items-latest-selected.zip`
    #[must_use]
    pub fn file_name(&self) -> String {
        self.name.to_string()
    }
}

#[derive(Debug)]
struct ViewState {
    view: Arc<Reconstruction>,
    selection: Selection,
    search: String,
    sort: SortMode,
    generation: u64,
    requested_target: VersionTarget,
    requested_show_removed: bool,
}

/// Gallery over one source
#[derive(Debug)]
pub struct Session {
    catalog: Catalog,
    degraded: bool,
    documents: DocumentStore,
    resolver: ContentResolver,
    reconstructor: Reconstructor,
    exporter: Exporter,
    paginator: Paginator,
    archive_prefix: String,
    state: RwLock<ViewState>,
}

impl Session {
    /// Open the source named in `config`
    ///
    /// # Errors
    /// Returns error if the source cannot be set up or the initial view
    /// cannot be reconstructed
    pub async fn open(config: &GalleryConfig) -> Result<Self, GalleryError> {
        config.validate()?;
        let source = source_for_location(&config.source.location, config.fetch.timeout())?;
        Self::with_source(config, source).await
    }

    /// Open over an explicit source
    ///
    /// An unavailable catalog degrades to [`Catalog::fallback`]. The initial
    /// view is reconstructed once, at `config.gallery.target` with
    /// `config.gallery.show_removed`.
    ///
    /// # Errors
    /// Returns [`GalleryError::BaseManifestMissing`] if the initial view
    /// cannot be reconstructed
    pub async fn with_source(
        config: &GalleryConfig,
        source: Arc<dyn ResourceSource>,
    ) -> Result<Self, GalleryError> {
        let documents = DocumentStore::new(Arc::clone(&source), config.layout.clone());

        let mut cache = ContentCache::new(&config.cache.name, config.cache.max_capacity);
        if let Some(dir) = &config.cache.disk_dir {
            cache = cache.with_disk_dir(dir);
        }
        let resolver = ContentResolver::new(source, config.layout.clone(), cache)
            .with_mode(config.fetch.content_mode)
            .with_batch_size(config.fetch.batch_size);

        let (catalog, degraded) = match documents.load_catalog().await {
            Ok(catalog) => (catalog, false),
            Err(e) => {
                let err = GalleryError::from(e);
                tracing::warn!(error = %err, "using fallback catalog");
                (Catalog::fallback(), true)
            }
        };

        let reconstructor = Reconstructor::new(config.fetch.batch_size);
        let target = config.gallery.target.clone();
        let show_removed = config.gallery.show_removed;
        let view = reconstructor
            .reconstruct(&documents, &catalog, &target, show_removed)
            .await?;

        tracing::info!(
            checkpoint = %target,
            versions = catalog.versions().len(),
            items = view.len(),
            degraded,
            "session opened"
        );

        Ok(Self {
            catalog,
            degraded,
            documents,
            resolver,
            reconstructor,
            exporter: Exporter::new(config.gallery.compression)
                .with_batch_size(config.fetch.batch_size),
            paginator: Paginator::new(config.gallery.page_size),
            archive_prefix: config.gallery.archive_prefix.clone(),
            state: RwLock::new(ViewState {
                view: Arc::new(view),
                selection: Selection::new(),
                search: String::new(),
                sort: SortMode::default(),
                generation: 0,
                requested_target: target,
                requested_show_removed: show_removed,
            }),
        })
    }

    /// Version catalog in use
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Whether the catalog is the built-in fallback
    #[inline]
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Content resolver
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &ContentResolver {
        &self.resolver
    }

    /// Committed view
    #[must_use]
    pub fn reconstruction(&self) -> Arc<Reconstruction> {
        Arc::clone(&self.state.read().view)
    }

    /// Target of the committed view
    #[must_use]
    pub fn target(&self) -> VersionTarget {
        self.state.read().view.target().clone()
    }

    /// Whether the committed view includes removed items
    #[must_use]
    pub fn show_removed(&self) -> bool {
        self.state.read().view.show_removed()
    }

    /// Switch to `target`
    ///
    /// # Errors
    /// Returns [`GalleryError::BaseManifestMissing`] if the view cannot be
    /// rebuilt; the previous view stays in place
    pub async fn set_target(
        &self,
        target: VersionTarget,
    ) -> Result<ReconstructOutcome, GalleryError> {
        let request = {
            let mut state = self.state.write();
            state.generation += 1;
            state.requested_target = target;
            (
                state.generation,
                state.requested_target.clone(),
                state.requested_show_removed,
            )
        };
        self.rebuild(request).await
    }

    /// Show or hide removed items
    ///
    /// # Errors
    /// Returns [`GalleryError::BaseManifestMissing`] if the view cannot be
    /// rebuilt; the previous view stays in place
    pub async fn set_show_removed(
        &self,
        show_removed: bool,
    ) -> Result<ReconstructOutcome, GalleryError> {
        let request = {
            let mut state = self.state.write();
            state.generation += 1;
            state.requested_show_removed = show_removed;
            (
                state.generation,
                state.requested_target.clone(),
                state.requested_show_removed,
            )
        };
        self.rebuild(request).await
    }

    async fn rebuild(
        &self,
        (generation, target, show_removed): (u64, VersionTarget, bool),
    ) -> Result<ReconstructOutcome, GalleryError> {
        let result = self
            .reconstructor
            .reconstruct(&self.documents, &self.catalog, &target, show_removed)
            .await;

        let mut state = self.state.write();
        if state.generation != generation {
            tracing::debug!(
                checkpoint = %target,
                generation,
                newest = state.generation,
                "discarding superseded reconstruction"
            );
            return Ok(ReconstructOutcome::Superseded);
        }

        match result {
            Ok(view) => {
                let pruned = state.selection.retain_present(&view);
                let skipped_versions = view.skipped().iter().map(|s| s.version.clone()).collect();
                tracing::info!(
                    checkpoint = %target,
                    items = view.len(),
                    pruned = pruned.len(),
                    "view updated"
                );
                state.view = Arc::new(view);
                Ok(ReconstructOutcome::Applied {
                    pruned,
                    skipped_versions,
                })
            }
            Err(e) => {
                let err = GalleryError::from(e);
                tracing::warn!(checkpoint = %target, error = %err, "keeping previous view");
                state.requested_target = state.view.target().clone();
                state.requested_show_removed = state.view.show_removed();
                Err(err)
            }
        }
    }

    /// Flip selection of `filename`; returns whether it is now selected
    ///
    /// # Errors
    /// Returns [`GalleryError::UnknownItem`] if the item is not in the view
    pub fn toggle(&self, filename: &str) -> Result<bool, GalleryError> {
        let mut state = self.state.write();
        if !state.view.contains(filename) {
            return Err(GalleryError::UnknownItem(filename.to_string()));
        }
        Ok(state.selection.toggle(filename))
    }

    /// Add `filename` to the selection; returns whether it was newly added
    ///
    /// # Errors
    /// Returns [`GalleryError::UnknownItem`] if the item is not in the view
    pub fn select(&self, filename: &str) -> Result<bool, GalleryError> {
        let mut state = self.state.write();
        if !state.view.contains(filename) {
            return Err(GalleryError::UnknownItem(filename.to_string()));
        }
        let added = !state.selection.contains(filename);
        state.selection.insert(filename);
        Ok(added)
    }

    /// Deselect everything
    pub fn clear_selection(&self) {
        self.state.write().selection.clear();
    }

    /// Select every item matching the current search; returns the selection size
    pub fn select_all_visible(&self) -> usize {
        let mut state = self.state.write();
        let visible = project(&state.view, &state.search, state.sort);
        state.selection.select_all(visible);
        state.selection.len()
    }

    /// Current selection
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.state.read().selection.clone()
    }

    /// Set the search term
    pub fn set_search(&self, term: impl Into<String>) {
        self.state.write().search = term.into();
    }

    /// Current search term
    #[must_use]
    pub fn search(&self) -> String {
        self.state.read().search.clone()
    }

    /// Set the sort mode
    pub fn set_sort(&self, sort: SortMode) {
        self.state.write().sort = sort;
    }

    /// Current sort mode
    #[must_use]
    pub fn sort(&self) -> SortMode {
        self.state.read().sort
    }

    /// Visible filenames in display order
    #[must_use]
    pub fn visible(&self) -> Vec<String> {
        let state = self.state.read();
        project(&state.view, &state.search, state.sort)
    }

    /// Page of visible items starting at `cursor`, with content resolved
    ///
    /// Items whose content cannot be fetched come back with `content: None`.
    pub async fn page(&self, cursor: Cursor) -> Page {
        let (view, selection, visible) = {
            let state = self.state.read();
            let visible = project(&state.view, &state.search, state.sort);
            (Arc::clone(&state.view), state.selection.clone(), visible)
        };

        let (names, next) = self.paginator.next_batch(&visible, cursor);
        let records: Vec<_> = names.iter().filter_map(|n| view.get(n)).collect();
        let keys: Vec<ResourceKey> = records
            .iter()
            .map(|r| ResourceKey::image(r.version().clone(), r.filename()))
            .collect();
        let contents = self.resolver.resolve_many(&keys).await;

        let items = records
            .into_iter()
            .zip(contents)
            .map(|(record, content)| {
                let content = match content {
                    Ok(blob) => Some(blob),
                    Err(e) => {
                        tracing::debug!(error = %e, "placeholder for item");
                        None
                    }
                };
                PageItem {
                    filename: record.filename().to_string(),
                    display_name: display_name(record.filename()),
                    version: record.version().clone(),
                    removed: view.is_removed(record.filename()),
                    selected: selection.contains(record.filename()),
                    content,
                }
            })
            .collect();

        Page {
            items,
            next,
            total: visible.len(),
        }
    }

    /// Content of one item as of its provenance version
    ///
    /// # Errors
    /// Returns [`GalleryError::UnknownItem`] if the item is not in the view,
    /// or [`GalleryError::ResourceUnavailable`] if it cannot be fetched
    pub async fn download(&self, filename: &str) -> Result<Blob, GalleryError> {
        let key = {
            let state = self.state.read();
            let record = state
                .view
                .get(filename)
                .ok_or_else(|| GalleryError::UnknownItem(filename.to_string()))?;
            ResourceKey::image(record.version().clone(), filename)
        };
        Ok(self.resolver.resolve(&key).await?)
    }

    /// Export the selection, or the visible items if nothing is selected
    ///
    /// # Errors
    /// Returns [`GalleryError::EmptyArchive`] if no item made it into the archive
    pub async fn export(
        &self,
        progress: &mut ProgressTracker,
    ) -> Result<NamedArchive, GalleryError> {
        let (view, scope, names) = {
            let state = self.state.read();
            let (scope, names) = if state.selection.is_empty() {
                let scope = if state.search.trim().is_empty() {
                    ExportScope::All
                } else {
                    ExportScope::Filtered
                };
                (scope, project(&state.view, &state.search, state.sort))
            } else {
                let names = state.selection.iter().map(str::to_string).collect();
                (ExportScope::Selected, names)
            };
            (Arc::clone(&state.view), scope, names)
        };

        let entries: Vec<(String, ResourceKey)> = names
            .into_iter()
            .filter_map(|name| {
                let version = view.get(&name)?.version().clone();
                let key = ResourceKey::image(version, name.as_str());
                Some((name, key))
            })
            .collect();

        let name = ArchiveName::new(&self.archive_prefix, view.target().clone(), scope);
        tracing::info!(archive = %name, items = entries.len(), "exporting");
        let archive = self
            .exporter
            .export(&entries, &self.resolver, progress)
            .await?;
        Ok(NamedArchive { name, archive })
    }
}
