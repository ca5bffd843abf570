//! Gallery Core
//!
//! A versioned image gallery: pick a version, see which images exist at
//! that point and which release each one comes from, search and select,
//! and export a ZIP.
//!
//! # Core Concepts
//!
//! - [`Session`]: catalog, committed view, selection and search over one source
//! - [`Selection`], [`project`], [`Paginator`]: pure view-side state and queries
//! - [`Exporter`]: batched resolution into a deterministic ZIP with progress
//! - [`GalleryConfig`]: TOML configuration with defaults for every field
//! - [`GalleryError`]: error taxonomy shared by every operation
//!
//! # Architecture
//!
//! ```text
//! DocumentStore ──catalog/manifest/changes──▶ Reconstructor ──▶ Reconstruction
//!                                                                  │
//!          Selection ◀── Session ──▶ project(search, sort) ◀───────┘
//!                          │
//!                          ▼
//!          ContentResolver (moka) ──▶ Exporter ──▶ ZIP
//! ```
//!
//! # Example
//!
//! ```no_run
//! use gallery_core::{GalleryConfig, ProgressTracker, Session};
//!
//! # async fn run() -> Result<(), gallery_core::GalleryError> {
//! let config = GalleryConfig::new().with_location("https://cdn.example.com/items");
//! let session = Session::open(&config).await?;
//! session.set_search("apple");
//! let export = session.export(&mut ProgressTracker::silent()).await?;
//! std::fs::write(export.file_name(), export.archive.bytes()).ok();
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

mod config;
mod error;
mod export;
mod paginator;
mod projection;
mod selection;
mod session;

pub use config::{
    CacheConfig, ConfigError, FetchConfig, GalleryConfig, SourceConfig, ViewConfig,
    DEFAULT_ARCHIVE_PREFIX, DEFAULT_PAGE_SIZE,
};
pub use error::GalleryError;
pub use export::{
    ArchiveName, ExportError, ExportScope, ExportedArchive, Exporter, Phase, Progress,
    ProgressTracker, SkippedEntry,
};
pub use paginator::{Cursor, Paginator};
pub use projection::{display_name, project, SortMode};
pub use selection::Selection;
pub use session::{NamedArchive, Page, PageItem, ReconstructOutcome, Session};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
