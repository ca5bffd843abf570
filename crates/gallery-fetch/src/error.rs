//! Error types for sources and content resolution

use crate::key::ResourceKey;
use std::path::PathBuf;

/// Errors raised by a [`ResourceSource`](crate::ResourceSource)
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// Path is empty, absolute, or climbs out of the source root
    #[error("invalid resource path: '{0}'")]
    InvalidPath(String),

    /// Server answered with a non-success status other than 404
    #[error("{path}: HTTP status {status}")]
    Status { path: String, status: u16 },

    /// Connection, timeout or body read failure
    #[error("{path}: {reason}")]
    Transport { path: String, reason: String },

    /// Filesystem failure other than not-found
    #[error("{}: {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    /// Source could not be constructed
    #[error("source setup failed: {0}")]
    Setup(String),
}

impl SourceError {
    /// Transport failure for `path`
    pub fn transport(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::Transport {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

/// Errors resolving content for a key
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// Content for this key could not be obtained; affects this key only
    #[error("resource unavailable: {key}: {reason}")]
    ResourceUnavailable { key: ResourceKey, reason: String },
}

impl FetchError {
    /// Unavailable `key`
    pub fn unavailable(key: ResourceKey, reason: impl ToString) -> Self {
        Self::ResourceUnavailable {
            key,
            reason: reason.to_string(),
        }
    }

    /// Key the failure is attributed to
    #[inline]
    #[must_use]
    pub fn key(&self) -> &ResourceKey {
        match self {
            Self::ResourceUnavailable { key, .. } => key,
        }
    }
}
