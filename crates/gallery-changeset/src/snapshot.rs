//! Image directory snapshots
//!
//! A snapshot maps each image filename in a directory to the hash of its
//! bytes. Snapshots produce base manifests and, diffed against each other,
//! the changeset a new release publishes.

use crate::document::{Changeset, Manifest};
use crate::hash::ContentHash;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Extension of the images a release ships
pub const IMAGE_EXTENSION: &str = "png";

/// Filename → content hash for one directory
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectorySnapshot {
    files: BTreeMap<String, ContentHash>,
}

impl DirectorySnapshot {
    /// Snapshot from explicit entries
    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, ContentHash)>,
        S: Into<String>,
    {
        Self {
            files: entries.into_iter().map(|(n, h)| (n.into(), h)).collect(),
        }
    }

    /// Hash every `.<extension>` file directly inside `dir`
    ///
    /// Subdirectories are not descended into; the extension match is
    /// case-insensitive.
    ///
    /// # Errors
    /// Returns error if the directory or a file cannot be read
    pub async fn scan(dir: impl AsRef<Path>, extension: &str) -> Result<Self, SnapshotError> {
        let dir = dir.as_ref();
        let mut reader = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| SnapshotError::io(dir, e))?;

        let mut files = BTreeMap::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| SnapshotError::io(dir, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| SnapshotError::io(&path, e))?;
            if !file_type.is_file() || !has_extension(&path, extension) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                tracing::warn!(path = %path.display(), "skipping non UTF-8 filename");
                continue;
            };

            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| SnapshotError::io(&path, e))?;
            files.insert(name.to_string(), ContentHash::compute(&bytes));
        }

        tracing::debug!(dir = %dir.display(), files = files.len(), "scanned image directory");
        Ok(Self { files })
    }

    /// Filenames with their hashes
    #[inline]
    #[must_use]
    pub fn files(&self) -> &BTreeMap<String, ContentHash> {
        &self.files
    }

    /// Number of images
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// No images
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Base manifest listing this snapshot, stamped with the current time
    #[must_use]
    pub fn manifest(&self) -> Manifest {
        Manifest {
            images: self.files.keys().cloned().collect(),
            total_count: Some(self.files.len()),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    /// Changeset turning this snapshot into `newer`
    ///
    /// Files whose hash differs are listed as modified.
    #[must_use]
    pub fn diff(&self, newer: &Self) -> Changeset {
        let mut changeset = Changeset::default();

        for (name, hash) in &newer.files {
            match self.files.get(name) {
                None => changeset.added.push(name.clone()),
                Some(old) if old != hash => changeset.modified.push(name.clone()),
                Some(_) => {}
            }
        }

        changeset.removed = self
            .files
            .keys()
            .filter(|name| !newer.files.contains_key(*name))
            .cloned()
            .collect();

        changeset
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Errors scanning an image directory
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// IO error
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SnapshotError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
