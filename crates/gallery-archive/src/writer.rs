//! Deterministic ZIP writer
//!
//! Entries are written in insertion order with a fixed 1980-01-01
//! timestamp, so the same inputs always produce the same bytes.

use crate::entry::{validate_entry_name, Compression};
use crate::error::ArchiveError;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{DateTime, ZipWriter};

/// In-memory ZIP builder
pub struct ArchiveWriter {
    compression: Compression,
    inner: ZipWriter<Cursor<Vec<u8>>>,
    names: HashSet<String>,
}

impl ArchiveWriter {
    /// Empty archive writing entries with `compression`
    #[must_use]
    pub fn new(compression: Compression) -> Self {
        Self {
            compression,
            inner: ZipWriter::new(Cursor::new(Vec::new())),
            names: HashSet::new(),
        }
    }

    /// Compression applied to new entries
    #[inline]
    #[must_use]
    pub fn compression(&self) -> Compression {
        self.compression
    }

    fn options(&self) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(self.compression.method())
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644)
    }

    /// Append a file entry
    ///
    /// A rejected name leaves the archive unchanged and the writer usable.
    ///
    /// # Errors
    /// Returns [`ArchiveError::InvalidName`] or [`ArchiveError::DuplicateEntry`]
    /// for a name the archive cannot hold, or a container error if writing fails
    pub fn add(&mut self, name: &str, data: &[u8]) -> Result<(), ArchiveError> {
        validate_entry_name(name)?;
        if self.names.contains(name) {
            return Err(ArchiveError::DuplicateEntry(name.to_string()));
        }

        let options = self.options();
        self.inner.start_file(name, options)?;
        self.inner.write_all(data)?;
        self.names.insert(name.to_string());

        tracing::trace!(name, size = data.len(), "added archive entry");
        Ok(())
    }

    /// Number of entries written so far
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// No entries written
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Write the central directory and return the archive bytes
    ///
    /// # Errors
    /// Returns error if the central directory cannot be written
    pub fn finish(self) -> Result<Vec<u8>, ArchiveError> {
        let entries = self.names.len();
        let bytes = self.inner.finish()?.into_inner();
        tracing::debug!(entries, bytes = bytes.len(), "archive finished");
        Ok(bytes)
    }
}

impl std::fmt::Debug for ArchiveWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveWriter")
            .field("compression", &self.compression)
            .field("entries", &self.names.len())
            .finish_non_exhaustive()
    }
}
