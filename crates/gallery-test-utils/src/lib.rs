//! Testing utilities for the gallery workspace
//!
//! Builds published release trees in a [`MemorySource`] using the default
//! [`SourceLayout`].

#![allow(missing_docs)]

use gallery_archive::{ArchiveWriter, Compression};
use gallery_changeset::{Changeset, Manifest};
use gallery_fetch::{MemorySource, ResourceSource, SourceLayout};
use gallery_version::{CatalogDocument, VersionId};
use std::sync::Arc;

pub fn v(s: &str) -> VersionId {
    s.parse().unwrap()
}

/// Bytes a fixture publishes for `filename` at `version`
pub fn image_bytes(version: &str, filename: &str) -> Vec<u8> {
    format!("{version}:{filename}").into_bytes()
}

#[derive(Debug, Clone, Default)]
pub struct ReleaseFixture {
    source: MemorySource,
    layout: SourceLayout,
}

impl ReleaseFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> MemorySource {
        self.source.clone()
    }

    pub fn shared_source(&self) -> Arc<dyn ResourceSource> {
        Arc::new(self.source.clone())
    }

    pub fn layout(&self) -> &SourceLayout {
        &self.layout
    }

    pub fn catalog(&self, versions: &[&str], base: &str) -> &Self {
        let doc = CatalogDocument {
            versions: versions.iter().map(|s| (*s).to_string()).collect(),
            base: base.to_string(),
        };
        self.source.insert(
            self.layout.catalog_path().to_string(),
            serde_json::to_vec(&doc).unwrap(),
        );
        self
    }

    /// Base manifest plus loose images for every listed name
    pub fn base(&self, version: &str, images: &[&str]) -> &Self {
        let manifest = Manifest::new(images.iter().copied());
        self.source.insert(
            self.layout.manifest_path(&v(version)),
            manifest.to_json_pretty().unwrap().into_bytes(),
        );
        self.images(version, images)
    }

    /// Changeset plus loose images for added and modified names
    pub fn changeset(&self, version: &str, added: &[&str], modified: &[&str], removed: &[&str]) -> &Self {
        let changeset = Changeset {
            added: added.iter().map(|s| (*s).to_string()).collect(),
            modified: modified.iter().map(|s| (*s).to_string()).collect(),
            removed: removed.iter().map(|s| (*s).to_string()).collect(),
        };
        self.source.insert(
            self.layout.changeset_path(&v(version)),
            changeset.to_json_pretty().unwrap().into_bytes(),
        );
        self.images(version, added).images(version, modified)
    }

    pub fn images(&self, version: &str, names: &[&str]) -> &Self {
        for name in names {
            self.source
                .insert(self.layout.image_path(&v(version), name), image_bytes(version, name));
        }
        self
    }

    /// Release archive holding `names`, nested under `images/`
    pub fn release(&self, version: &str, names: &[&str]) -> &Self {
        let mut writer = ArchiveWriter::new(Compression::Deflate);
        for name in names {
            writer
                .add(&format!("images/{name}"), &image_bytes(version, name))
                .unwrap();
        }
        self.source
            .insert(self.layout.archive_path(&v(version)), writer.finish().unwrap());
        self
    }

    /// Stop serving the loose image
    pub fn drop_image(&self, version: &str, name: &str) -> &Self {
        self.source.remove(&self.layout.image_path(&v(version), name));
        self
    }
}

/// Catalog `[1.21.4, 1.21.5]`, base `1.21.4` with `apple.png`; 1.21.5 adds
/// `banana.png` and removes `apple.png`
pub fn example_fixture() -> ReleaseFixture {
    let fixture = ReleaseFixture::new();
    fixture
        .catalog(&["1.21.4", "1.21.5"], "1.21.4")
        .base("1.21.4", &["apple.png"])
        .changeset("1.21.5", &["banana.png"], &[], &["apple.png"]);
    fixture
}

/// Four versions touching a handful of items
pub fn history_fixture() -> ReleaseFixture {
    let fixture = ReleaseFixture::new();
    fixture
        .catalog(&["1.20", "1.20.1", "1.21", "1.21.1"], "1.20")
        .base("1.20", &["apple.png", "stone.png", "oak_log.png", "dirt.png"])
        .changeset("1.20.1", &["golden_apple.png"], &["stone.png"], &[])
        .changeset("1.21", &["copper_ingot.png"], &[], &["dirt.png"])
        .changeset("1.21.1", &[], &["apple.png"], &["oak_log.png"]);
    fixture
}
