//! Dotted numeric version identifiers
//!
//! Provides [`VersionId`], the identifier of one release of the image set,
//! and [`VersionTarget`], the checkpoint a gallery view is reconstructed at.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Sentinel accepted wherever a version target is parsed
pub const LATEST: &str = "latest";

/// Release identifier such as `1.21.4`
///
/// Ordered component-wise by numeric value, with missing trailing components
/// treated as zero. Equality and hashing use the same normalization, so
/// `1.21` and `1.21.0` are the same version; [`Display`] keeps the spelling
/// the identifier was parsed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionId {
    raw: String,
    components: Vec<u64>,
}

impl VersionId {
    /// Parse an identifier
    ///
    /// # Errors
    /// Returns error if the string is empty or any component is not a
    /// non-negative integer
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }

        let components = trimmed
            .split('.')
            .map(|part| {
                if part.is_empty() {
                    return Err(VersionError::EmptyComponent(trimmed.to_string()));
                }
                part.parse::<u64>()
                    .map_err(|_| VersionError::InvalidComponent {
                        version: trimmed.to_string(),
                        component: part.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: trimmed.to_string(),
            components,
        })
    }

    pub(crate) fn from_components(raw: &str, components: Vec<u64>) -> Self {
        Self {
            raw: raw.to_string(),
            components,
        }
    }

    /// Identifier as written
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Numeric components, as written
    #[inline]
    #[must_use]
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Components with trailing zeros removed
    #[must_use]
    pub fn normalized(&self) -> &[u64] {
        let end = self
            .components
            .iter()
            .rposition(|&c| c != 0)
            .map_or(0, |i| i + 1);
        &self.components[..end]
    }

    /// Canonical dotted spelling shared by all equal identifiers (`1.21.0` → `1.21`)
    #[must_use]
    pub fn normalized_string(&self) -> String {
        match self.normalized() {
            [] => "0".to_string(),
            parts => parts
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join("."),
        }
    }
}

/// Chronological comparison of two identifiers
///
/// First differing component decides; a missing component counts as `0`.
#[must_use]
pub fn compare(a: &VersionId, b: &VersionId) -> Ordering {
    let len = a.components.len().max(b.components.len());
    for i in 0..len {
        let left = a.components.get(i).copied().unwrap_or(0);
        let right = b.components.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

impl PartialEq for VersionId {
    fn eq(&self, other: &Self) -> bool {
        compare(self, other) == Ordering::Equal
    }
}

impl Eq for VersionId {}

impl PartialOrd for VersionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionId {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

impl Hash for VersionId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl Display for VersionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for VersionId {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionId {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VersionId> for String {
    fn from(value: VersionId) -> Self {
        value.raw
    }
}

/// Checkpoint a view is reconstructed at
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum VersionTarget {
    /// Every known version applied
    #[default]
    Latest,
    /// Versions up to and including this one
    Version(VersionId),
}

impl VersionTarget {
    /// Whether `version` falls at or before this target
    #[inline]
    #[must_use]
    pub fn includes(&self, version: &VersionId) -> bool {
        match self {
            Self::Latest => true,
            Self::Version(target) => version <= target,
        }
    }

    /// Explicit version, if any
    #[inline]
    #[must_use]
    pub fn version(&self) -> Option<&VersionId> {
        match self {
            Self::Latest => None,
            Self::Version(v) => Some(v),
        }
    }
}

impl Display for VersionTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST),
            Self::Version(v) => write!(f, "{v}"),
        }
    }
}

impl FromStr for VersionTarget {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(LATEST) {
            Ok(Self::Latest)
        } else {
            VersionId::parse(s).map(Self::Version)
        }
    }
}

impl TryFrom<String> for VersionTarget {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersionTarget> for String {
    fn from(value: VersionTarget) -> Self {
        value.to_string()
    }
}

impl From<VersionId> for VersionTarget {
    fn from(value: VersionId) -> Self {
        Self::Version(value)
    }
}

/// Errors parsing version identifiers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// Empty identifier
    #[error("version identifier is empty")]
    Empty,

    /// Two consecutive dots, or a leading/trailing dot
    #[error("version '{0}' contains an empty component")]
    EmptyComponent(String),

    /// Component is not a non-negative integer
    #[error("version '{version}' has non-numeric component '{component}'")]
    InvalidComponent { version: String, component: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> VersionId {
        VersionId::parse(s).unwrap()
    }

    #[test]
    fn normalized_string_drops_trailing_zeros() {
        assert_eq!(v("1.21.0").normalized_string(), "1.21");
        assert_eq!(v("0.0").normalized_string(), "0");
        assert_eq!(v("1.21.4").normalized_string(), "1.21.4");
    }

    #[test]
    fn parse_components() {
        assert_eq!(v("1.21.4").components(), &[1, 21, 4]);
        assert_eq!(v(" 1.2 ").as_str(), "1.2");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(VersionId::parse(""), Err(VersionError::Empty));
        assert!(matches!(
            VersionId::parse("1..2"),
            Err(VersionError::EmptyComponent(_))
        ));
        assert!(matches!(
            VersionId::parse("1.21-pre1"),
            Err(VersionError::InvalidComponent { .. })
        ));
        assert!(VersionId::parse("1.-2").is_err());
    }

    #[test]
    fn numeric_not_lexical_ordering() {
        assert!(v("1.9") < v("1.10"));
        assert!(v("1.21.10") > v("1.21.9"));
        assert!(v("2") > v("1.99.99"));
    }

    #[test]
    fn missing_components_are_zero() {
        assert_eq!(compare(&v("1.21"), &v("1.21.0")), Ordering::Equal);
        assert_eq!(v("1.21"), v("1.21.0.0"));
        assert!(v("1.21") < v("1.21.1"));
    }

    #[test]
    fn equal_versions_hash_equally() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(v("1.21"));
        assert!(set.contains(&v("1.21.0")));
        assert!(!set.contains(&v("1.21.1")));
    }

    #[test]
    fn display_keeps_spelling() {
        assert_eq!(v("1.21.0").to_string(), "1.21.0");
        assert_eq!(v("1.21").normalized(), &[1, 21]);
        assert_eq!(v("0.0").normalized(), &[] as &[u64]);
    }

    #[test]
    fn serde_as_string() {
        let json = serde_json::to_string(&v("1.21.4")).unwrap();
        assert_eq!(json, "\"1.21.4\"");
        let back: VersionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v("1.21.4"));
        assert!(serde_json::from_str::<VersionId>("\"x.y\"").is_err());
    }

    #[test]
    fn target_parse_and_includes() {
        let latest: VersionTarget = "Latest".parse().unwrap();
        assert_eq!(latest, VersionTarget::Latest);
        assert!(latest.includes(&v("99")));

        let target: VersionTarget = "1.21.4".parse().unwrap();
        assert!(target.includes(&v("1.21.4")));
        assert!(target.includes(&v("1.21")));
        assert!(!target.includes(&v("1.21.5")));
        assert_eq!(target.to_string(), "1.21.4");
        assert_eq!(VersionTarget::Latest.to_string(), "latest");
    }
}
