//! Byte sources the gallery reads published content from
//!
//! A source maps a relative path to bytes. Missing content is `Ok(None)`,
//! never an error, so callers can tell "not published" from "broken".

mod dir;
mod http;
mod memory;

pub use dir::DirSource;
pub use http::HttpSource;
pub use memory::MemorySource;

use crate::error::SourceError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Async byte source addressed by relative paths
#[async_trait]
pub trait ResourceSource: Send + Sync + std::fmt::Debug {
    /// Bytes at `path`; `Ok(None)` if nothing is published there
    ///
    /// # Errors
    /// Returns error on transport or I/O failure, or an invalid path
    async fn fetch(&self, path: &str) -> Result<Option<Arc<[u8]>>, SourceError>;

    /// File names directly under `dir`; `Ok(None)` if the source cannot list
    ///
    /// # Errors
    /// Returns error if listing is supported but fails
    async fn list(&self, dir: &str) -> Result<Option<Vec<String>>, SourceError> {
        let _ = dir;
        Ok(None)
    }
}

/// Source for a configured location: `http(s)://` URLs use [`HttpSource`],
/// anything else is a directory
///
/// # Errors
/// Returns error if the HTTP client cannot be built
pub fn source_for_location(
    location: &str,
    timeout: Duration,
) -> Result<Arc<dyn ResourceSource>, SourceError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Arc::new(HttpSource::new(location, timeout)?))
    } else {
        Ok(Arc::new(DirSource::new(location)))
    }
}

/// Reject paths that are empty, absolute, or contain `..`
pub(crate) fn check_relative(path: &str) -> Result<(), SourceError> {
    let bad = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|seg| seg == "..");
    if bad {
        Err(SourceError::InvalidPath(path.to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_path_checks() {
        assert!(check_relative("1.21/images/a.png").is_ok());
        assert!(check_relative("").is_err());
        assert!(check_relative("/abs").is_err());
        assert!(check_relative("1.21/../../x").is_err());
    }

    #[test]
    fn location_selects_source_kind() {
        let http = source_for_location("https://cdn.example.com/items", Duration::from_secs(5))
            .unwrap();
        assert!(format!("{http:?}").starts_with("HttpSource"));
        let dir = source_for_location("./public", Duration::from_secs(5)).unwrap();
        assert!(format!("{dir:?}").starts_with("DirSource"));
    }
}
