//! Error types for archive handling

/// Errors reading or writing ZIP archives
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Entry name already written
    #[error("duplicate archive entry: '{0}'")]
    DuplicateEntry(String),

    /// Entry name is empty, absolute, or escapes the archive root
    #[error("invalid archive entry name: '{0}'")]
    InvalidName(String),

    /// ZIP container error
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Reading or writing entry data failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// Whether the error concerns one entry name and leaves the writer usable
    #[inline]
    #[must_use]
    pub fn is_entry_rejected(&self) -> bool {
        matches!(self, Self::DuplicateEntry(_) | Self::InvalidName(_))
    }
}
