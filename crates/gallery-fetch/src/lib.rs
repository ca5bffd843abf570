//! Gallery Fetch
//!
//! Everything between the gallery and the bytes it shows: sources, the
//! path layout, a keyed content cache and the memoizing document store.
//!
//! # Core Concepts
//!
//! - [`ResourceSource`]: async path → bytes ([`HttpSource`], [`DirSource`], [`MemorySource`])
//! - [`SourceLayout`]: path templates for catalog, manifests, changesets, images, archives
//! - [`ResourceKey`]: `(version, filename)` image or per-version archive identity
//! - [`ContentCache`]: moka cache with optional disk tier, coalescing concurrent misses
//! - [`ContentResolver`]: cache-first resolution, loose or archive content mode
//! - [`DocumentStore`]: catalog loading and [`ChangesetProvider`](gallery_changeset::ChangesetProvider)
//!
//! # Example
//!
//! ```no_run
//! use gallery_fetch::{ContentCache, ContentResolver, DirSource, ResourceKey, SourceLayout};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = ContentResolver::new(
//!     Arc::new(DirSource::new("public")),
//!     SourceLayout::default(),
//!     ContentCache::default(),
//! );
//! let blob = resolver
//!     .resolve(&ResourceKey::image("1.21.4".parse()?, "apple.png"))
//!     .await?;
//! println!("{} bytes, {}", blob.len(), blob.hash());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

mod cache;
mod documents;
mod error;
mod key;
mod layout;
mod resolver;
mod source;

pub use cache::{ContentCache, DEFAULT_CACHE_NAME, DEFAULT_MAX_CAPACITY};
pub use documents::DocumentStore;
pub use error::{FetchError, SourceError};
pub use key::{Blob, ResourceKey};
pub use layout::SourceLayout;
pub use resolver::{ContentMode, ContentResolver, DEFAULT_FETCH_BATCH};
pub use source::{source_for_location, DirSource, HttpSource, MemorySource, ResourceSource};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
