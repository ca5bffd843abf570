//! Replay of a base manifest and ordered changesets
//!
//! [`Replay`] is the I/O-free core of reconstruction: it is seeded from the
//! base manifest and then fed one changeset per version, in ascending
//! version order, producing a [`Reconstruction`].
//!
//! # Same-version conflicts
//!
//! A name listed as removed and also as added or modified within one
//! changeset is kept: the add/modify wins and the removal is ignored. A name
//! listed as both added and modified is applied once, as an addition.

use crate::document::{Changeset, Manifest};
use gallery_version::{VersionId, VersionTarget};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// How a version touched a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Present in the base manifest
    Base,
    /// Introduced (or re-introduced) by a changeset
    Added,
    /// Content replaced by a changeset
    Modified,
}

/// One content change in a file's history
///
/// The content reference is the pair (`version`, filename).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HistoryEntry {
    /// Version whose content this entry refers to
    pub version: VersionId,
    /// Kind of change
    pub kind: ChangeKind,
}

/// Reconstructed view of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRecord {
    filename: String,
    version: VersionId,
    history: Vec<HistoryEntry>,
}

impl ItemRecord {
    fn new(filename: &str, version: &VersionId, kind: ChangeKind, mut history: Vec<HistoryEntry>) -> Self {
        history.push(HistoryEntry {
            version: version.clone(),
            kind,
        });
        Self {
            filename: filename.to_string(),
            version: version.clone(),
            history,
        }
    }

    fn record(&mut self, version: &VersionId, kind: ChangeKind) {
        self.version = version.clone();
        self.history.push(HistoryEntry {
            version: version.clone(),
            kind,
        });
    }

    /// Filename
    #[inline]
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Resolving version (provenance of the current content)
    #[inline]
    #[must_use]
    pub fn version(&self) -> &VersionId {
        &self.version
    }

    /// Every content change, in application order
    #[inline]
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Version the file first appeared in
    #[inline]
    #[must_use]
    pub fn introduced_in(&self) -> &VersionId {
        self.history.first().map_or(&self.version, |e| &e.version)
    }
}

/// Version whose changeset could not be used
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedVersion {
    /// Version skipped
    pub version: VersionId,
    /// Why
    pub reason: String,
}

/// Visible files and their provenance at one target version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconstruction {
    target: VersionTarget,
    base: VersionId,
    show_removed: bool,
    items: BTreeMap<String, ItemRecord>,
    removed: BTreeSet<String>,
    applied: Vec<VersionId>,
    skipped: Vec<SkippedVersion>,
}

impl Reconstruction {
    /// Target this view was built for
    #[inline]
    #[must_use]
    pub fn target(&self) -> &VersionTarget {
        &self.target
    }

    /// Base version
    #[inline]
    #[must_use]
    pub fn base(&self) -> &VersionId {
        &self.base
    }

    /// Whether removed files were retained and tagged
    #[inline]
    #[must_use]
    pub fn show_removed(&self) -> bool {
        self.show_removed
    }

    /// Record for `filename`
    #[inline]
    #[must_use]
    pub fn get(&self, filename: &str) -> Option<&ItemRecord> {
        self.items.get(filename)
    }

    /// Whether `filename` is in the view
    #[inline]
    #[must_use]
    pub fn contains(&self, filename: &str) -> bool {
        self.items.contains_key(filename)
    }

    /// Number of files in the view
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// View is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Records ordered by filename
    pub fn items(&self) -> impl Iterator<Item = &ItemRecord> {
        self.items.values()
    }

    /// Filenames in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Whether `filename` is retained but tagged removed
    #[inline]
    #[must_use]
    pub fn is_removed(&self, filename: &str) -> bool {
        self.removed.contains(filename)
    }

    /// Removed-tagged filenames (empty unless `show_removed`)
    #[inline]
    #[must_use]
    pub fn removed(&self) -> &BTreeSet<String> {
        &self.removed
    }

    /// Versions whose changesets were applied, ascending
    #[inline]
    #[must_use]
    pub fn applied(&self) -> &[VersionId] {
        &self.applied
    }

    /// Versions skipped because their changeset was unavailable
    #[inline]
    #[must_use]
    pub fn skipped(&self) -> &[SkippedVersion] {
        &self.skipped
    }
}

/// Incremental replay state
#[derive(Debug, Clone)]
pub struct Replay {
    base: VersionId,
    show_removed: bool,
    items: BTreeMap<String, ItemRecord>,
    removed: BTreeSet<String>,
    // History of files dropped from `items`, continued if they are re-added.
    retired: HashMap<String, Vec<HistoryEntry>>,
    applied: Vec<VersionId>,
}

impl Replay {
    /// Seed from the base manifest
    #[must_use]
    pub fn from_base(base: VersionId, manifest: &Manifest, show_removed: bool) -> Self {
        let items = manifest
            .images
            .iter()
            .map(|name| {
                (
                    name.clone(),
                    ItemRecord::new(name, &base, ChangeKind::Base, Vec::new()),
                )
            })
            .collect();

        Self {
            base,
            show_removed,
            items,
            removed: BTreeSet::new(),
            retired: HashMap::new(),
            applied: Vec::new(),
        }
    }

    /// Apply one version's changeset
    ///
    /// Callers must feed versions in ascending order.
    pub fn apply(&mut self, version: &VersionId, changeset: &Changeset) {
        let added: BTreeSet<&str> = changeset.added.iter().map(String::as_str).collect();
        let modified: BTreeSet<&str> = changeset.modified.iter().map(String::as_str).collect();

        for name in &changeset.removed {
            if added.contains(name.as_str()) || modified.contains(name.as_str()) {
                tracing::debug!(
                    version = %version,
                    file = %name,
                    "removal ignored, file also added or modified in this version"
                );
                continue;
            }
            self.remove(name);
        }

        for name in &added {
            self.add(version, name);
        }

        for name in modified.difference(&added) {
            self.modify(version, name);
        }

        tracing::debug!(
            version = %version,
            added = added.len(),
            modified = modified.len(),
            removed = changeset.removed.len(),
            "applied changeset"
        );
        self.applied.push(version.clone());
    }

    fn remove(&mut self, name: &str) {
        if self.show_removed {
            if self.items.contains_key(name) {
                self.removed.insert(name.to_string());
            }
        } else if let Some(record) = self.items.remove(name) {
            self.retired.insert(name.to_string(), record.history);
        }
    }

    fn add(&mut self, version: &VersionId, name: &str) {
        self.removed.remove(name);
        match self.items.get_mut(name) {
            Some(record) => record.record(version, ChangeKind::Added),
            None => {
                let history = self.retired.remove(name).unwrap_or_default();
                self.items.insert(
                    name.to_string(),
                    ItemRecord::new(name, version, ChangeKind::Added, history),
                );
            }
        }
    }

    fn modify(&mut self, version: &VersionId, name: &str) {
        self.removed.remove(name);
        match self.items.get_mut(name) {
            Some(record) => record.record(version, ChangeKind::Modified),
            None => {
                tracing::debug!(version = %version, file = %name, "modified file had no prior record");
                self.retired.remove(name);
                self.items.insert(
                    name.to_string(),
                    ItemRecord::new(name, version, ChangeKind::Modified, Vec::new()),
                );
            }
        }
    }

    /// Finish into a reconstruction for `target`
    #[must_use]
    pub fn finish(self, target: VersionTarget, skipped: Vec<SkippedVersion>) -> Reconstruction {
        Reconstruction {
            target,
            base: self.base,
            show_removed: self.show_removed,
            items: self.items,
            removed: self.removed,
            applied: self.applied,
            skipped,
        }
    }
}

/// Replay `steps` over the base manifest in one call
#[must_use]
pub fn replay<'a, I>(
    base: &VersionId,
    manifest: &Manifest,
    steps: I,
    target: VersionTarget,
    show_removed: bool,
) -> Reconstruction
where
    I: IntoIterator<Item = (&'a VersionId, &'a Changeset)>,
{
    let mut state = Replay::from_base(base.clone(), manifest, show_removed);
    for (version, changeset) in steps {
        state.apply(version, changeset);
    }
    state.finish(target, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn v(s: &str) -> VersionId {
        s.parse().unwrap()
    }

    fn cs(added: &[&str], modified: &[&str], removed: &[&str]) -> Changeset {
        let own = |names: &[&str]| -> Vec<String> { names.iter().map(ToString::to_string).collect() };
        Changeset {
            added: own(added),
            modified: own(modified),
            removed: own(removed),
        }
    }

    fn versions_of(r: &Reconstruction) -> Vec<(String, String)> {
        r.items()
            .map(|i| (i.filename().to_string(), i.version().to_string()))
            .collect()
    }

    #[test]
    fn base_only() {
        let manifest = Manifest::new(["b.png", "a.png", "a.png"]);
        let r = replay(&v("1.0"), &manifest, std::iter::empty(), VersionTarget::Latest, false);
        assert_eq!(r.len(), 2);
        assert_eq!(r.get("a.png").unwrap().history()[0].kind, ChangeKind::Base);
        assert!(r.applied().is_empty());
    }

    #[test]
    fn example_hide_removed() {
        let manifest = Manifest::new(["apple.png"]);
        let change = cs(&["banana.png"], &[], &["apple.png"]);
        let r = replay(&v("1.21.4"), &manifest, [(&v("1.21.5"), &change)], VersionTarget::Latest, false);
        assert_eq!(versions_of(&r), vec![("banana.png".into(), "1.21.5".into())]);
        assert!(r.removed().is_empty());
    }

    #[test]
    fn example_show_removed() {
        let manifest = Manifest::new(["apple.png"]);
        let change = cs(&["banana.png"], &[], &["apple.png"]);
        let r = replay(&v("1.21.4"), &manifest, [(&v("1.21.5"), &change)], VersionTarget::Latest, true);
        assert_eq!(
            versions_of(&r),
            vec![
                ("apple.png".into(), "1.21.4".into()),
                ("banana.png".into(), "1.21.5".into())
            ]
        );
        assert!(r.is_removed("apple.png"));
        assert!(!r.is_removed("banana.png"));
        assert_eq!(r.get("apple.png").unwrap().history().len(), 1);
    }

    #[test]
    fn modify_appends_history() {
        let manifest = Manifest::new(["a.png"]);
        let c2 = cs(&[], &["a.png"], &[]);
        let c3 = cs(&[], &["a.png"], &[]);
        let r = replay(
            &v("1"),
            &manifest,
            [(&v("2"), &c2), (&v("3"), &c3)],
            VersionTarget::Latest,
            false,
        );
        let item = r.get("a.png").unwrap();
        assert_eq!(item.version(), &v("3"));
        assert_eq!(item.introduced_in(), &v("1"));
        let kinds: Vec<_> = item.history().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Base, ChangeKind::Modified, ChangeKind::Modified]);
    }

    #[test]
    fn readd_after_removal_continues_history() {
        let manifest = Manifest::new(["a.png"]);
        let c2 = cs(&[], &[], &["a.png"]);
        let c3 = cs(&["a.png"], &[], &[]);
        let r = replay(
            &v("1"),
            &manifest,
            [(&v("2"), &c2), (&v("3"), &c3)],
            VersionTarget::Latest,
            false,
        );
        let item = r.get("a.png").unwrap();
        assert_eq!(item.version(), &v("3"));
        let history: Vec<_> = item.history().iter().map(|e| e.version.to_string()).collect();
        assert_eq!(history, vec!["1", "3"]);
    }

    #[test]
    fn readd_clears_removed_tag() {
        let manifest = Manifest::new(["a.png"]);
        let c2 = cs(&[], &[], &["a.png"]);
        let c3 = cs(&["a.png"], &[], &[]);
        let r = replay(
            &v("1"),
            &manifest,
            [(&v("2"), &c2), (&v("3"), &c3)],
            VersionTarget::Latest,
            true,
        );
        assert!(!r.is_removed("a.png"));
        assert_eq!(r.get("a.png").unwrap().version(), &v("3"));
    }

    #[test]
    fn add_of_present_file_is_idempotent() {
        let manifest = Manifest::new(["a.png"]);
        let c2 = cs(&["a.png", "a.png"], &[], &[]);
        let r = replay(&v("1"), &manifest, [(&v("2"), &c2)], VersionTarget::Latest, false);
        assert_eq!(r.len(), 1);
        assert_eq!(r.get("a.png").unwrap().version(), &v("2"));
        assert_eq!(r.get("a.png").unwrap().history().len(), 2);
    }

    #[test]
    fn remove_of_absent_file_is_noop() {
        let manifest = Manifest::new(["a.png"]);
        let c2 = cs(&[], &[], &["ghost.png"]);
        for show in [false, true] {
            let r = replay(&v("1"), &manifest, [(&v("2"), &c2)], VersionTarget::Latest, show);
            assert_eq!(r.len(), 1);
            assert!(r.removed().is_empty());
        }
    }

    #[test]
    fn modify_without_record_starts_history() {
        let manifest = Manifest::default();
        let c2 = cs(&[], &["new.png"], &[]);
        let r = replay(&v("1"), &manifest, [(&v("2"), &c2)], VersionTarget::Latest, false);
        let item = r.get("new.png").unwrap();
        assert_eq!(item.history().len(), 1);
        assert_eq!(item.history()[0].kind, ChangeKind::Modified);
    }

    #[test]
    fn same_version_add_beats_remove() {
        let manifest = Manifest::new(["a.png"]);
        let c2 = cs(&["b.png"], &[], &["b.png"]);
        for show in [false, true] {
            let r = replay(&v("1"), &manifest, [(&v("2"), &c2)], VersionTarget::Latest, show);
            assert!(r.contains("b.png"));
            assert!(!r.is_removed("b.png"));
        }
    }

    #[test]
    fn same_version_modify_beats_remove() {
        let manifest = Manifest::new(["a.png"]);
        let c2 = cs(&[], &["a.png"], &["a.png"]);
        for show in [false, true] {
            let r = replay(&v("1"), &manifest, [(&v("2"), &c2)], VersionTarget::Latest, show);
            let item = r.get("a.png").unwrap();
            assert_eq!(item.version(), &v("2"));
            assert!(!r.is_removed("a.png"));
        }
    }

    #[test]
    fn same_version_add_and_modify_recorded_once() {
        let manifest = Manifest::default();
        let c2 = cs(&["a.png"], &["a.png"], &[]);
        let r = replay(&v("1"), &manifest, [(&v("2"), &c2)], VersionTarget::Latest, false);
        let kinds: Vec<_> = r.get("a.png").unwrap().history().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ChangeKind::Added]);
    }

    #[test]
    fn modify_of_tagged_file_clears_tag() {
        let manifest = Manifest::new(["a.png"]);
        let c2 = cs(&[], &[], &["a.png"]);
        let c3 = cs(&[], &["a.png"], &[]);
        let r = replay(
            &v("1"),
            &manifest,
            [(&v("2"), &c2), (&v("3"), &c3)],
            VersionTarget::Latest,
            true,
        );
        assert!(!r.is_removed("a.png"));
        assert_eq!(r.get("a.png").unwrap().version(), &v("3"));
    }
}
