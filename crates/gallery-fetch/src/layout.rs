//! Where each document and resource lives inside a source
//!
//! Templates substitute `{version}` and `{filename}`.

use crate::key::ResourceKey;
use gallery_version::VersionId;
use serde::{Deserialize, Serialize};

const VERSION_VAR: &str = "{version}";
const FILENAME_VAR: &str = "{filename}";

/// Path templates relative to the source root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLayout {
    /// Catalog document
    pub catalog: String,
    /// Base manifest per version
    pub manifest: String,
    /// Changeset per version
    pub changeset: String,
    /// Loose image
    pub image: String,
    /// Per-version release archive
    pub archive: String,
}

impl Default for SourceLayout {
    fn default() -> Self {
        Self {
            catalog: "versions.json".into(),
            manifest: "{version}/manifest.json".into(),
            changeset: "{version}/changes.json".into(),
            image: "{version}/images/{filename}".into(),
            archive: "releases/minecraft-items-{version}.zip".into(),
        }
    }
}

impl SourceLayout {
    /// Catalog path
    #[inline]
    #[must_use]
    pub fn catalog_path(&self) -> &str {
        &self.catalog
    }

    /// Base manifest path for `version`
    #[must_use]
    pub fn manifest_path(&self, version: &VersionId) -> String {
        self.manifest.replace(VERSION_VAR, version.as_str())
    }

    /// Changeset path for `version`
    #[must_use]
    pub fn changeset_path(&self, version: &VersionId) -> String {
        self.changeset.replace(VERSION_VAR, version.as_str())
    }

    /// Loose image path
    #[must_use]
    pub fn image_path(&self, version: &VersionId, filename: &str) -> String {
        self.image
            .replace(VERSION_VAR, version.as_str())
            .replace(FILENAME_VAR, filename)
    }

    /// Release archive path for `version`
    #[must_use]
    pub fn archive_path(&self, version: &VersionId) -> String {
        self.archive.replace(VERSION_VAR, version.as_str())
    }

    /// Path a key is fetched from in loose mode
    #[must_use]
    pub fn path_for(&self, key: &ResourceKey) -> String {
        match key {
            ResourceKey::Image { version, filename } => self.image_path(version, filename),
            ResourceKey::Archive { version } => self.archive_path(version),
        }
    }

    /// Directory holding release archives and the filename prefix before
    /// `{version}`, if the archive template has that shape
    ///
    /// `releases/minecraft-items-{version}.zip` → `("releases", "minecraft-items-")`.
    #[must_use]
    pub fn release_listing(&self) -> Option<(&str, &str)> {
        let (dir, file) = self.archive.rsplit_once('/').unwrap_or(("", &self.archive));
        if dir.contains(VERSION_VAR) || file.strip_suffix(".zip").is_none() {
            return None;
        }
        let (prefix, rest) = file.split_once(VERSION_VAR)?;
        (rest == ".zip").then_some((dir, prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn v(s: &str) -> VersionId {
        s.parse().unwrap()
    }

    #[test]
    fn default_paths() {
        let layout = SourceLayout::default();
        assert_eq!(layout.catalog_path(), "versions.json");
        assert_eq!(layout.manifest_path(&v("1.21.4")), "1.21.4/manifest.json");
        assert_eq!(layout.changeset_path(&v("1.21.5")), "1.21.5/changes.json");
        assert_eq!(
            layout.image_path(&v("1.21.5"), "banana.png"),
            "1.21.5/images/banana.png"
        );
        assert_eq!(
            layout.path_for(&ResourceKey::archive(v("1.21.5"))),
            "releases/minecraft-items-1.21.5.zip"
        );
    }

    #[test]
    fn paths_keep_version_spelling() {
        let layout = SourceLayout::default();
        assert_eq!(layout.manifest_path(&v("1.21")), "1.21/manifest.json");
    }

    #[test]
    fn release_listing_shape() {
        let layout = SourceLayout::default();
        assert_eq!(layout.release_listing(), Some(("releases", "minecraft-items-")));

        let flat = SourceLayout {
            archive: "{version}.zip".into(),
            ..SourceLayout::default()
        };
        assert_eq!(flat.release_listing(), Some(("", "")));

        let nested = SourceLayout {
            archive: "{version}/bundle.zip".into(),
            ..SourceLayout::default()
        };
        assert_eq!(nested.release_listing(), None);
    }

    #[test]
    fn partial_layout_fills_defaults() {
        let layout: SourceLayout = serde_json::from_str(r#"{"image":"img/{filename}"}"#).unwrap();
        assert_eq!(layout.image_path(&v("1"), "a.png"), "img/a.png");
        assert_eq!(layout.catalog, "versions.json");
    }
}
