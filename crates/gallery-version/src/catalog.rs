//! Release catalog
//!
//! The catalog is the chronologically ordered set of known versions plus the
//! designated base version whose manifest every changeset builds on. It is
//! loaded once per session and never mutated afterwards.

use crate::version::{VersionError, VersionId, VersionTarget};
use serde::{Deserialize, Serialize};

/// Release prefix used by published per-version archives
pub const DEFAULT_RELEASE_PREFIX: &str = "minecraft-items-";

/// Version used when no catalog can be loaded
pub const FALLBACK_VERSION: &str = "1.21.4";

/// Catalog document as published: `{ "versions": [...], "base": "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Known versions in any order
    #[serde(default)]
    pub versions: Vec<String>,
    /// Base version
    pub base: String,
}

/// Ordered set of known versions with a designated base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    versions: Vec<VersionId>,
    base: VersionId,
}

impl Catalog {
    /// Build catalog, sorting ascending and dropping duplicates
    #[must_use]
    pub fn new(mut versions: Vec<VersionId>, base: VersionId) -> Self {
        versions.sort();
        versions.dedup();

        if !versions.contains(&base) {
            tracing::warn!(base = %base, "base version is not listed in the catalog");
        }

        Self { versions, base }
    }

    /// Minimal catalog for degraded mode
    #[must_use]
    pub fn fallback() -> Self {
        let base = VersionId::from_components(FALLBACK_VERSION, vec![1, 21, 4]);
        Self::new(vec![base.clone()], base)
    }

    /// Build from a parsed catalog document
    ///
    /// Unparseable entries in `versions` are skipped with a warning; an
    /// unparseable base fails the whole catalog.
    ///
    /// # Errors
    /// Returns error if the base version is invalid
    pub fn from_document(doc: CatalogDocument) -> Result<Self, CatalogError> {
        let base = VersionId::parse(&doc.base)?;
        let versions = doc
            .versions
            .iter()
            .filter_map(|raw| match VersionId::parse(raw) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!(version = %raw, error = %e, "skipping invalid catalog entry");
                    None
                }
            })
            .collect();
        Ok(Self::new(versions, base))
    }

    /// Parse a catalog document from JSON bytes
    ///
    /// # Errors
    /// Returns error if the JSON is malformed or the base is invalid
    pub fn from_json(bytes: &[u8]) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_json::from_slice(bytes)?;
        Self::from_document(doc)
    }

    /// Build from a listing of release archive names
    ///
    /// Names of the form `<prefix><version>.zip` contribute a version; all
    /// other names are ignored.
    #[must_use]
    pub fn from_release_names<I, S>(names: I, prefix: &str, base: VersionId) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let versions = names
            .into_iter()
            .filter_map(|name| release_version(name.as_ref(), prefix))
            .collect();
        Self::new(versions, base)
    }

    /// Known versions, ascending
    #[inline]
    #[must_use]
    pub fn versions(&self) -> &[VersionId] {
        &self.versions
    }

    /// Base version
    #[inline]
    #[must_use]
    pub fn base(&self) -> &VersionId {
        &self.base
    }

    /// Whether the catalog lists `version`
    #[inline]
    #[must_use]
    pub fn contains(&self, version: &VersionId) -> bool {
        self.versions.binary_search(version).is_ok()
    }

    /// Newest known version (the base if nothing newer is listed)
    #[must_use]
    pub fn latest(&self) -> &VersionId {
        match self.versions.last() {
            Some(last) if *last > self.base => last,
            _ => &self.base,
        }
    }

    /// Concrete version a target resolves to
    #[must_use]
    pub fn resolve(&self, target: &VersionTarget) -> VersionId {
        match target {
            VersionTarget::Latest => self.latest().clone(),
            VersionTarget::Version(v) => v.clone(),
        }
    }

    /// Versions whose changesets apply when reconstructing `target`
    ///
    /// Strictly after the base, at or before the target, ascending.
    #[must_use]
    pub fn path_to(&self, target: &VersionTarget) -> Vec<VersionId> {
        if let VersionTarget::Version(v) = target {
            if !self.contains(v) {
                tracing::warn!(version = %v, "target version is not listed in the catalog");
            }
        }

        self.versions
            .iter()
            .filter(|v| **v > self.base && target.includes(v))
            .cloned()
            .collect()
    }
}

/// Extract the version from a release archive name
#[must_use]
pub fn release_version(name: &str, prefix: &str) -> Option<VersionId> {
    let rest = name.strip_prefix(prefix)?;
    let raw = rest.strip_suffix(".zip")?;
    VersionId::parse(raw).ok()
}

/// Errors loading a catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Catalog could not be retrieved
    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    /// Catalog JSON could not be parsed
    #[error("catalog document malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Base version is not a valid identifier
    #[error("catalog base version invalid: {0}")]
    InvalidBase(#[from] VersionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> VersionId {
        VersionId::parse(s).unwrap()
    }

    fn catalog() -> Catalog {
        Catalog::new(
            vec![v("1.21.6"), v("1.21.4"), v("1.21.5"), v("1.21.5"), v("1.20")],
            v("1.21.4"),
        )
    }

    #[test]
    fn versions_sorted_and_deduplicated() {
        let c = catalog();
        let listed: Vec<_> = c.versions().iter().map(ToString::to_string).collect();
        assert_eq!(listed, vec!["1.20", "1.21.4", "1.21.5", "1.21.6"]);
        assert_eq!(c.latest(), &v("1.21.6"));
    }

    #[test]
    fn path_excludes_base_and_earlier() {
        let c = catalog();
        assert_eq!(c.path_to(&VersionTarget::Latest), vec![v("1.21.5"), v("1.21.6")]);
        assert_eq!(c.path_to(&v("1.21.5").into()), vec![v("1.21.5")]);
        assert!(c.path_to(&v("1.21.4").into()).is_empty());
        assert!(c.path_to(&v("1.20").into()).is_empty());
    }

    #[test]
    fn path_for_unlisted_target_is_chronological() {
        let c = catalog();
        assert_eq!(c.path_to(&v("1.21.5.5").into()), vec![v("1.21.5")]);
    }

    #[test]
    fn base_missing_from_listing_is_tolerated() {
        let c = Catalog::new(vec![v("1.21.5")], v("1.21.4"));
        assert!(!c.contains(c.base()));
        assert_eq!(c.path_to(&VersionTarget::Latest), vec![v("1.21.5")]);
    }

    #[test]
    fn latest_falls_back_to_base() {
        let c = Catalog::new(vec![], v("1.21.4"));
        assert_eq!(c.latest(), &v("1.21.4"));
        assert_eq!(c.resolve(&VersionTarget::Latest), v("1.21.4"));
    }

    #[test]
    fn from_json_skips_bad_entries() {
        let json = br#"{"versions":["1.21.5","bogus","1.21.4"],"base":"1.21.4"}"#;
        let c = Catalog::from_json(json).unwrap();
        assert_eq!(c.versions().len(), 2);
        assert_eq!(c.base(), &v("1.21.4"));
    }

    #[test]
    fn from_json_rejects_bad_base() {
        let json = br#"{"versions":["1.21.5"],"base":"nope"}"#;
        assert!(matches!(Catalog::from_json(json), Err(CatalogError::InvalidBase(_))));
        assert!(matches!(Catalog::from_json(b"{"), Err(CatalogError::Malformed(_))));
    }

    #[test]
    fn fallback_is_usable() {
        let c = Catalog::fallback();
        assert_eq!(c.base().as_str(), FALLBACK_VERSION);
        assert!(c.path_to(&VersionTarget::Latest).is_empty());
    }

    #[test]
    fn release_names_become_versions() {
        let names = [
            "minecraft-items-1.21.5.zip",
            "minecraft-items-1.21.4.zip",
            "README.md",
            "minecraft-items-latest.zip",
            "other-1.0.zip",
        ];
        let c = Catalog::from_release_names(names, DEFAULT_RELEASE_PREFIX, v("1.21.4"));
        assert_eq!(c.versions(), &[v("1.21.4"), v("1.21.5")]);
    }
}
