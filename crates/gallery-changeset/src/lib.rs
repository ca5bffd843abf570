//! Gallery Changesets
//!
//! Rebuilds the set of visible images, and where each image's current
//! content comes from, at any version checkpoint.
//!
//! # Core Concepts
//!
//! - [`Manifest`]: base snapshot listing
//! - [`Changeset`]: added / modified / removed names for one version
//! - [`Replay`]: I/O-free application of changesets in version order
//! - [`Reconstructor`]: loads documents through a [`ChangesetProvider`] and replays them
//! - [`Reconstruction`]: filename → [`ItemRecord`] with provenance and history
//! - [`DirectorySnapshot`]: hashed image directory, source of manifests and diffs
//!
//! # Architecture
//!
//! ```text
//! Catalog ──path_to(target)──▶ [v1, v2, ...]
//!                                   │
//! base manifest ──▶ Replay ◀── changeset(v) (batched fetch, ordered apply)
//!                     │
//!                     ▼
//!               Reconstruction
//! ```

#![warn(unreachable_pub)]

mod document;
mod hash;
mod reconstruct;
mod replay;
mod snapshot;

pub use document::{Changeset, Manifest};
pub use hash::ContentHash;
pub use reconstruct::{
    ChangesetProvider, ProviderError, ReconstructError, Reconstructor, DEFAULT_BATCH_SIZE,
};
pub use replay::{
    replay, ChangeKind, HistoryEntry, ItemRecord, Reconstruction, Replay, SkippedVersion,
};
pub use snapshot::{DirectorySnapshot, SnapshotError, IMAGE_EXTENSION};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
