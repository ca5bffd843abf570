//! User selection of item filenames

use gallery_changeset::Reconstruction;
use std::collections::BTreeSet;

/// Set of selected filenames
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    names: BTreeSet<String>,
}

impl Selection {
    /// Empty selection
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `name`; returns whether it is now selected
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.names.remove(name) {
            false
        } else {
            self.names.insert(name.to_string());
            true
        }
    }

    /// Select `name`
    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Deselect everything
    pub fn clear(&mut self) {
        self.names.clear();
    }

    /// Add every name in `visible`
    pub fn select_all<I, S>(&mut self, visible: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(visible.into_iter().map(Into::into));
    }

    /// Drop names that are not in `reconstruction`; returns the dropped names
    pub fn retain_present(&mut self, reconstruction: &Reconstruction) -> Vec<String> {
        let (kept, pruned): (BTreeSet<String>, BTreeSet<String>) =
            std::mem::take(&mut self.names)
                .into_iter()
                .partition(|name| reconstruction.contains(name));
        self.names = kept;
        if !pruned.is_empty() {
            tracing::debug!(pruned = pruned.len(), "selection pruned");
        }
        pruned.into_iter().collect()
    }

    /// Whether `name` is selected
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Selected names in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of selected names
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Nothing selected
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
