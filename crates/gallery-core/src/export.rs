//! Archive export with progress reporting
//!
//! Export runs in two phases. `Gathering` resolves content in batches and
//! covers 0–90%; `Packaging` writes the ZIP and covers 90–100%. Items that
//! cannot be fetched or whose names an archive cannot hold are skipped; an
//! export with nothing left fails.

use gallery_archive::{validate_entry_name, ArchiveError, ArchiveWriter, Compression};
use gallery_fetch::{Blob, ContentResolver, ResourceKey, DEFAULT_FETCH_BATCH};
use gallery_version::VersionTarget;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::{self, Display};

const GATHER_SPAN: usize = 90;

/// Export phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Fetching content
    Gathering,
    /// Writing the archive
    Packaging,
}

/// One progress report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Current phase
    pub phase: Phase,
    /// Overall completion, 0..=100
    pub percent: u8,
    /// Items processed in this phase
    pub done: usize,
    /// Items in this phase
    pub total: usize,
}

/// Forwards progress to a callback, never letting the percentage go down
pub struct ProgressTracker {
    last: u8,
    sink: Box<dyn FnMut(Progress) + Send>,
}

impl ProgressTracker {
    /// Tracker calling `sink` for every report
    pub fn new(sink: impl FnMut(Progress) + Send + 'static) -> Self {
        Self {
            last: 0,
            sink: Box::new(sink),
        }
    }

    /// Tracker that drops reports
    #[must_use]
    pub fn silent() -> Self {
        Self::new(|_| {})
    }

    /// Highest percentage reported so far
    #[inline]
    #[must_use]
    pub fn percent(&self) -> u8 {
        self.last
    }

    fn report(&mut self, phase: Phase, percent: usize, done: usize, total: usize) {
        let percent = u8::try_from(percent.min(100)).unwrap_or(100).max(self.last);
        self.last = percent;
        (self.sink)(Progress {
            phase,
            percent,
            done,
            total,
        });
    }
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

/// Which items an archive holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExportScope {
    /// Every visible item
    All,
    /// The user's selection
    Selected,
    /// Items matching the current search
    Filtered,
}

/// Archive file name: `<prefix>-<target>[-selected|-filtered].zip`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName {
    prefix: String,
    target: VersionTarget,
    scope: ExportScope,
}

impl ArchiveName {
    /// Name for `target` and `scope`
    #[must_use]
    pub fn new(prefix: impl Into<String>, target: VersionTarget, scope: ExportScope) -> Self {
        Self {
            prefix: prefix.into(),
            target,
            scope,
        }
    }

    /// Scope
    #[inline]
    #[must_use]
    pub fn scope(&self) -> ExportScope {
        self.scope
    }
}

impl Display for ArchiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.scope {
            ExportScope::All => "",
            ExportScope::Selected => "-selected",
            ExportScope::Filtered => "-filtered",
        };
        write!(f, "{}-{}{suffix}.zip", self.prefix, self.target)
    }
}

/// An item left out of an archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    /// Filename requested
    pub filename: String,
    /// Why it was left out
    pub reason: String,
}

/// Finished archive
#[derive(Debug, Clone)]
pub struct ExportedArchive {
    bytes: Vec<u8>,
    included: Vec<String>,
    skipped: Vec<SkippedEntry>,
}

impl ExportedArchive {
    /// ZIP bytes
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take the ZIP bytes
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Entry names in archive order
    #[inline]
    #[must_use]
    pub fn included(&self) -> &[String] {
        &self.included
    }

    /// Requested items that were left out
    #[inline]
    #[must_use]
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }
}

/// Export errors
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// No requested item made it into the archive
    #[error("archive would be empty: none of {requested} item(s) could be exported")]
    EmptyArchive { requested: usize },

    /// ZIP writer failed
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),
}

/// Resolves items and packs them into a ZIP
#[derive(Debug, Clone, Copy)]
pub struct Exporter {
    compression: Compression,
    batch_size: usize,
}

impl Exporter {
    /// Exporter writing entries with `compression`
    #[must_use]
    pub fn new(compression: Compression) -> Self {
        Self {
            compression,
            batch_size: DEFAULT_FETCH_BATCH,
        }
    }

    /// Set how many items are resolved concurrently
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Build an archive of `entries`, each `(entry name, key)`
    ///
    /// Repeated entry names are exported once. Names an archive cannot hold
    /// are skipped without fetching; unresolvable items are logged. Both are
    /// listed in [`ExportedArchive::skipped`].
    ///
    /// # Errors
    /// Returns [`ExportError::EmptyArchive`] if no entry made it into the
    /// archive
    pub async fn export(
        &self,
        entries: &[(String, ResourceKey)],
        resolver: &ContentResolver,
        progress: &mut ProgressTracker,
    ) -> Result<ExportedArchive, ExportError> {
        let mut skipped = Vec::new();
        let mut seen = HashSet::new();
        let mut unique: Vec<&(String, ResourceKey)> = Vec::with_capacity(entries.len());
        for entry in entries {
            if !seen.insert(entry.0.as_str()) {
                continue;
            }
            match validate_entry_name(&entry.0) {
                Ok(()) => unique.push(entry),
                Err(e) => skip(&mut skipped, &entry.0, &e),
            }
        }
        let requested = seen.len();
        let entries = unique;
        let total = entries.len();
        tracing::info!(items = total, compression = ?self.compression, "export started");

        progress.report(Phase::Gathering, 0, 0, total);

        let mut gathered: Vec<(&str, Blob)> = Vec::with_capacity(total);
        let mut done = 0;
        for batch in entries.chunks(self.batch_size) {
            let keys: Vec<ResourceKey> = batch.iter().map(|(_, key)| key.clone()).collect();
            let results = resolver.resolve_many(&keys).await;
            for (entry, result) in batch.iter().copied().zip(results) {
                let name = &entry.0;
                match result {
                    Ok(blob) => gathered.push((name.as_str(), blob)),
                    Err(e) => skip(&mut skipped, name, &e),
                }
            }
            done += batch.len();
            progress.report(Phase::Gathering, done * GATHER_SPAN / total, done, total);
        }

        if gathered.is_empty() {
            tracing::warn!(requested, "nothing to export");
            return Err(ExportError::EmptyArchive { requested });
        }

        let count = gathered.len();
        progress.report(Phase::Packaging, GATHER_SPAN, 0, count);
        let mut writer = ArchiveWriter::new(self.compression);
        let mut included = Vec::with_capacity(count);
        for (i, (name, blob)) in gathered.into_iter().enumerate() {
            match writer.add(name, blob.bytes()) {
                Ok(()) => included.push(name.to_string()),
                Err(e) if e.is_entry_rejected() => skip(&mut skipped, name, &e),
                Err(e) => return Err(e.into()),
            }
            let percent = GATHER_SPAN + (i + 1) * (100 - GATHER_SPAN) / count;
            progress.report(Phase::Packaging, percent, i + 1, count);
        }
        if included.is_empty() {
            tracing::warn!(requested, "nothing to export");
            return Err(ExportError::EmptyArchive { requested });
        }
        let bytes = writer.finish()?;
        progress.report(Phase::Packaging, 100, count, count);

        tracing::info!(
            included = included.len(),
            skipped = skipped.len(),
            bytes = bytes.len(),
            "export finished"
        );
        Ok(ExportedArchive {
            bytes,
            included,
            skipped,
        })
    }
}

fn skip(skipped: &mut Vec<SkippedEntry>, name: &str, reason: &dyn Display) {
    tracing::warn!(item = %name, error = %reason, "skipping item in export");
    skipped.push(SkippedEntry {
        filename: name.to_string(),
        reason: reason.to_string(),
    });
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(Compression::default())
    }
}
