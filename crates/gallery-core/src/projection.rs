//! Search, sort and display names over a reconstruction
//!
//! A projection is a pure function of the reconstruction, the search term
//! and the sort mode.

use gallery_changeset::{ItemRecord, Reconstruction};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// Item ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Filename ascending
    #[default]
    NameAsc,
    /// Filename descending
    NameDesc,
    /// Longest display name first, then filename ascending
    DisplayLengthDesc,
    /// Most recently touched first, then filename ascending
    VersionDesc,
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name-asc" | "name" => Ok(Self::NameAsc),
            "name-desc" => Ok(Self::NameDesc),
            "display-length-desc" | "length" => Ok(Self::DisplayLengthDesc),
            "version-desc" | "version" => Ok(Self::VersionDesc),
            other => Err(format!("unknown sort mode '{other}'")),
        }
    }
}

/// Human-readable name for a filename
///
/// Drops the extension, turns `_` into spaces and capitalizes each word:
/// `golden_apple.png` → `Golden Apple`.
#[must_use]
pub fn display_name(filename: &str) -> String {
    let stem = filename
        .rsplit_once('.')
        .map_or(filename, |(stem, _)| stem);
    stem.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Filenames in `reconstruction` matching `search`, ordered by `sort`
///
/// The search is a case-insensitive substring match on the display name;
/// an empty or blank term keeps everything.
#[must_use]
pub fn project(reconstruction: &Reconstruction, search: &str, sort: SortMode) -> Vec<String> {
    let needle = search.trim().to_lowercase();

    let mut rows: Vec<(&ItemRecord, String)> = reconstruction
        .items()
        .map(|item| (item, display_name(item.filename())))
        .filter(|(_, display)| needle.is_empty() || display.to_lowercase().contains(&needle))
        .collect();

    rows.sort_by(|(a, da), (b, db)| compare(sort, a, da, b, db));
    rows.into_iter()
        .map(|(item, _)| item.filename().to_string())
        .collect()
}

fn compare(sort: SortMode, a: &ItemRecord, da: &str, b: &ItemRecord, db: &str) -> Ordering {
    let by_name = || a.filename().cmp(b.filename());
    match sort {
        SortMode::NameAsc => by_name(),
        SortMode::NameDesc => by_name().reverse(),
        SortMode::DisplayLengthDesc => db
            .chars()
            .count()
            .cmp(&da.chars().count())
            .then_with(by_name),
        SortMode::VersionDesc => b.version().cmp(a.version()).then_with(by_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_changeset::{replay, Changeset, Manifest};
    use gallery_version::{VersionId, VersionTarget};
    use pretty_assertions::assert_eq;

    fn v(s: &str) -> VersionId {
        s.parse().unwrap()
    }

    fn view() -> Reconstruction {
        let changeset = Changeset {
            added: vec!["golden_apple.png".into()],
            modified: vec!["stone.png".into()],
            ..Changeset::default()
        };
        let two = v("1.21.5");
        replay(
            &v("1.21.4"),
            &Manifest::new(["apple.png", "stone.png", "oak_log.png"]),
            [(&two, &changeset)],
            VersionTarget::Latest,
            false,
        )
    }

    #[test]
    fn display_names() {
        assert_eq!(display_name("golden_apple.png"), "Golden Apple");
        assert_eq!(display_name("stone.png"), "Stone");
        assert_eq!(display_name("tnt"), "Tnt");
        assert_eq!(display_name("a__b.png"), "A B");
        assert_eq!(display_name("music_disc_11.png"), "Music Disc 11");
    }

    #[test]
    fn search_matches_display_name_case_insensitively() {
        assert_eq!(
            project(&view(), "APPLE", SortMode::NameAsc),
            vec!["apple.png", "golden_apple.png"]
        );
        assert_eq!(project(&view(), "golden apple", SortMode::NameAsc), vec!["golden_apple.png"]);
        assert_eq!(project(&view(), "  ", SortMode::NameAsc).len(), 4);
        assert!(project(&view(), "diamond", SortMode::NameAsc).is_empty());
    }

    #[test]
    fn sort_modes() {
        let view = view();
        assert_eq!(
            project(&view, "", SortMode::NameAsc),
            vec!["apple.png", "golden_apple.png", "oak_log.png", "stone.png"]
        );
        assert_eq!(
            project(&view, "", SortMode::NameDesc),
            vec!["stone.png", "oak_log.png", "golden_apple.png", "apple.png"]
        );
        assert_eq!(
            project(&view, "", SortMode::DisplayLengthDesc),
            vec!["golden_apple.png", "oak_log.png", "apple.png", "stone.png"]
        );
        assert_eq!(
            project(&view, "", SortMode::VersionDesc),
            vec!["golden_apple.png", "stone.png", "apple.png", "oak_log.png"]
        );
    }

    #[test]
    fn sort_mode_parsing() {
        assert_eq!("name-desc".parse::<SortMode>().unwrap(), SortMode::NameDesc);
        assert_eq!("version".parse::<SortMode>().unwrap(), SortMode::VersionDesc);
        assert!("random".parse::<SortMode>().is_err());
    }
}
