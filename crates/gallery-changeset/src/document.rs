//! Published documents: base manifest and per-version changesets

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Base manifest: `{ "images": [...], "totalCount": n, "createdAt": "..." }`
///
/// Only `images` is required; the other fields are informational and written
/// by the manifest generator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Image filenames in the snapshot
    #[serde(default)]
    pub images: Vec<String>,

    /// Number of images at generation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,

    /// Generation timestamp, kept verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Manifest {
    /// Manifest listing `images`
    #[must_use]
    pub fn new<I, S>(images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            images: images.into_iter().map(Into::into).collect(),
            total_count: None,
            created_at: None,
        }
    }

    /// Parse from JSON bytes
    ///
    /// # Errors
    /// Returns error if the JSON is malformed
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Pretty JSON encoding
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Delta published for one version, relative to the state just before it
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Changeset {
    /// Newly introduced filenames
    #[serde(default)]
    pub added: Vec<String>,
    /// Filenames whose content changed
    #[serde(default)]
    pub modified: Vec<String>,
    /// Filenames no longer shipped
    #[serde(default)]
    pub removed: Vec<String>,
}

impl Changeset {
    /// Parse from JSON bytes
    ///
    /// # Errors
    /// Returns error if the JSON is malformed
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Pretty JSON encoding
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// No changes at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    /// Total number of listed names
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }

    /// Names listed as removed and also added or modified in this changeset
    #[must_use]
    pub fn conflicting_removals(&self) -> BTreeSet<&str> {
        let kept: BTreeSet<&str> = self
            .added
            .iter()
            .chain(&self.modified)
            .map(String::as_str)
            .collect();
        self.removed
            .iter()
            .map(String::as_str)
            .filter(|name| kept.contains(name))
            .collect()
    }
}
