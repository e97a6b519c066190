//! Story folder names.

use std::fmt;
use std::path::{Component, Path};

use chrono::{DateTime, Utc};
use saga_core::error::DomainError;

/// Prefix of every generated story folder.
pub const FOLDER_PREFIX: &str = "story_";

/// Name of a story folder directly under the data directory.
///
/// Always a single normal path component, so joining it onto the data
/// directory can never escape it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoryFolder(String);

impl StoryFolder {
    /// Validates a client-supplied folder name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for empty names and names that are
    /// not exactly one normal path component (separators, `.`, `..`).
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        let mut components = Path::new(name).components();
        let single_normal = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if name.is_empty() || !single_normal || name.contains(['/', '\\']) {
            return Err(DomainError::Validation(format!(
                "invalid story folder: {name:?}"
            )));
        }
        Ok(Self(name.to_owned()))
    }

    /// Folder name for a story saved at `at`: `story_YYYYMMDD_HHMMSS`.
    #[must_use]
    pub fn timestamped(at: DateTime<Utc>) -> Self {
        Self(format!("{FOLDER_PREFIX}{}", at.format("%Y%m%d_%H%M%S")))
    }

    /// The same name with a numeric suffix, used when the name is taken.
    #[must_use]
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}_{n}", self.0))
    }

    /// The folder name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_timestamped_name_uses_compact_datetime() {
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 9, 3, 7).unwrap();

        assert_eq!(StoryFolder::timestamped(at).as_str(), "story_20260105_090307");
    }

    #[test]
    fn test_suffix_is_appended_with_underscore() {
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 9, 3, 7).unwrap();

        assert_eq!(
            StoryFolder::timestamped(at).with_suffix(2).as_str(),
            "story_20260105_090307_2"
        );
    }

    #[test]
    fn test_parse_accepts_plain_names() {
        assert!(StoryFolder::parse("story_20260105_090307").is_ok());
        assert!(StoryFolder::parse("my tale").is_ok());
    }

    #[test]
    fn test_parse_rejects_traversal_and_separators() {
        for bad in ["", ".", "..", "../etc", "a/b", "a\\b", "/abs"] {
            assert!(
                matches!(StoryFolder::parse(bad), Err(DomainError::Validation(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
