//! In-memory source for tests and fixtures
//!
//! Counts fetches per path and can inject failures or delays.

use super::{check_relative, ResourceSource};
use crate::error::SourceError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct State {
    files: HashMap<String, Arc<[u8]>>,
    failures: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    fetches: HashMap<String, usize>,
}

/// Path → bytes map implementing [`ResourceSource`]
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    state: Arc<RwLock<State>>,
}

impl MemorySource {
    /// Empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `bytes` at `path`
    pub fn insert(&self, path: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.state.write().files.insert(path.into(), bytes.into());
    }

    /// Unpublish `path`
    pub fn remove(&self, path: &str) {
        self.state.write().files.remove(path);
    }

    /// Make fetches of `path` fail with a transport error
    pub fn fail(&self, path: impl Into<String>, reason: impl Into<String>) {
        self.state.write().failures.insert(path.into(), reason.into());
    }

    /// Stop failing `path`
    pub fn heal(&self, path: &str) {
        self.state.write().failures.remove(path);
    }

    /// Delay fetches of `path`
    pub fn delay(&self, path: impl Into<String>, delay: Duration) {
        self.state.write().delays.insert(path.into(), delay);
    }

    /// Times `path` was fetched
    #[must_use]
    pub fn fetch_count(&self, path: &str) -> usize {
        self.state.read().fetches.get(path).copied().unwrap_or(0)
    }

    /// Fetches across all paths
    #[must_use]
    pub fn total_fetches(&self) -> usize {
        self.state.read().fetches.values().sum()
    }

    /// Forget fetch counts
    pub fn reset_counts(&self) {
        self.state.write().fetches.clear();
    }
}

#[async_trait]
impl ResourceSource for MemorySource {
    async fn fetch(&self, path: &str) -> Result<Option<Arc<[u8]>>, SourceError> {
        check_relative(path)?;
        let delay = {
            let mut state = self.state.write();
            *state.fetches.entry(path.to_string()).or_default() += 1;
            state.delays.get(path).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.read();
        if let Some(reason) = state.failures.get(path) {
            return Err(SourceError::transport(path, reason));
        }
        Ok(state.files.get(path).cloned())
    }

    async fn list(&self, dir: &str) -> Result<Option<Vec<String>>, SourceError> {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir.trim_end_matches('/'))
        };
        let mut names: Vec<String> = self
            .state
            .read()
            .files
            .keys()
            .filter_map(|path| path.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('/'))
            .map(str::to_string)
            .collect();
        names.sort();
        Ok(Some(names))
    }
}
