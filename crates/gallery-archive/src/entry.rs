//! Entry naming and compression settings

use crate::error::ArchiveError;
use serde::{Deserialize, Serialize};
use zip::CompressionMethod;

/// Entry compression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Bytes copied verbatim (PNGs are already compressed)
    #[default]
    Stored,
    /// Raw deflate
    Deflate,
}

impl Compression {
    pub(crate) fn method(self) -> CompressionMethod {
        match self {
            Self::Stored => CompressionMethod::Stored,
            Self::Deflate => CompressionMethod::Deflated,
        }
    }
}

/// Reject names that are empty, absolute, or climb out of the root
///
/// # Errors
/// Returns [`ArchiveError::InvalidName`] for a name an archive must not hold
pub fn validate_entry_name(name: &str) -> Result<(), ArchiveError> {
    let bad = name.is_empty()
        || name.len() > usize::from(u16::MAX)
        || name.starts_with('/')
        || name.contains('\\')
        || name.contains('\0')
        || name.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        Err(ArchiveError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}

/// Final path segment of an entry name
#[inline]
#[must_use]
pub fn basename(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_and_nested_names_accepted() {
        assert!(validate_entry_name("apple.png").is_ok());
        assert!(validate_entry_name("images/apple.png").is_ok());
    }

    #[test]
    fn unsafe_names_rejected() {
        for name in ["", "/abs.png", "../up.png", "a/../b.png", "a\\b.png", "a//b.png", "./a.png"] {
            assert!(
                matches!(validate_entry_name(name), Err(ArchiveError::InvalidName(n)) if n == name),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn basename_takes_last_segment() {
        assert_eq!(basename("images/stone.png"), "stone.png");
        assert_eq!(basename("stone.png"), "stone.png");
    }
}
