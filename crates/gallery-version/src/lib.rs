//! Gallery Versioning
//!
//! Release identifiers and the catalog of known releases.
//!
//! # Core Concepts
//!
//! - [`VersionId`]: dotted numeric identifier, totally ordered
//! - [`VersionTarget`]: `latest` or an explicit checkpoint
//! - [`Catalog`]: ascending known versions plus the base version
//!
//! # Example
//!
//! ```rust
//! use gallery_version::{Catalog, VersionId, VersionTarget};
//!
//! let base: VersionId = "1.21.4".parse().unwrap();
//! let next: VersionId = "1.21.5".parse().unwrap();
//! let catalog = Catalog::new(vec![next.clone(), base.clone()], base);
//!
//! assert_eq!(catalog.path_to(&VersionTarget::Latest), vec![next]);
//! ```

#![warn(unreachable_pub)]

mod catalog;
mod version;

pub use catalog::{
    release_version, Catalog, CatalogDocument, CatalogError, DEFAULT_RELEASE_PREFIX,
    FALLBACK_VERSION,
};
pub use version::{compare, VersionError, VersionId, VersionTarget, LATEST};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
