//! Release archive lookup
//!
//! Published release archives may nest images under a directory, so
//! lookups match the full entry name first and then the basename.

use crate::entry::basename;
use crate::error::ArchiveError;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// Largest up-front allocation for one entry; bigger entries grow as read.
const MAX_PREALLOC: u64 = 16 * 1024 * 1024;

/// ZIP archive borrowed from a byte slice
pub struct ArchiveReader<'a> {
    inner: ZipArchive<Cursor<&'a [u8]>>,
    files: Vec<String>,
}

impl<'a> ArchiveReader<'a> {
    /// Parse the central directory of `data`
    ///
    /// # Errors
    /// Returns error if `data` is not a readable ZIP archive
    pub fn new(data: &'a [u8]) -> Result<Self, ArchiveError> {
        let inner = ZipArchive::new(Cursor::new(data))?;
        let files = inner
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(str::to_string)
            .collect();
        Ok(Self { inner, files })
    }

    /// File entry names in central directory order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    /// Number of file entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// No file entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Entry whose full name, or failing that whose basename, equals `name`
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&str> {
        self.names()
            .find(|entry| *entry == name)
            .or_else(|| self.names().find(|entry| basename(entry) == name))
    }

    /// Read the entry matched by [`find`](Self::find); `Ok(None)` if absent
    ///
    /// # Errors
    /// Returns error if the matched entry is encrypted, uses an unsupported
    /// method, or fails its checksum
    pub fn read_by_name(&mut self, name: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
        let Some(entry) = self.find(name).map(str::to_string) else {
            return Ok(None);
        };
        let mut file = self.inner.by_name(&entry)?;
        let capacity = usize::try_from(file.size().min(MAX_PREALLOC)).unwrap_or_default();
        let mut out = Vec::with_capacity(capacity);
        file.read_to_end(&mut out)?;
        tracing::trace!(entry = %entry, size = out.len(), "read archive entry");
        Ok(Some(out))
    }
}

impl std::fmt::Debug for ArchiveReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveReader")
            .field("files", &self.files.len())
            .finish_non_exhaustive()
    }
}
