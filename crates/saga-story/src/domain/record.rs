//! The `story_data.json` record and the views derived from it.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::folder::StoryFolder;

/// Contents of a story folder's `story_data.json`.
///
/// Kept as a JSON object so fields written by other tools survive a
/// publish round trip.
pub type StoryRecord = Map<String, Value>;

/// Formats a timestamp the way browsers do (`toISOString`).
#[must_use]
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn text(record: &StoryRecord, key: &str) -> Option<String> {
    match record.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Returns whether a record has been published.
#[must_use]
pub fn is_published(record: &StoryRecord) -> bool {
    match record.get("published") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

/// A published story as listed in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorySummary {
    /// Folder the story lives in.
    pub folder: String,
    /// Title, `Untitled Story` when missing.
    pub title: String,
    /// Author, `Anonymous` when missing.
    pub author: String,
    /// Blurb, `No description` when missing.
    pub description: String,
    /// Cover image URL, possibly empty.
    pub cover_image: String,
    /// Publish time, falling back to the creation time.
    pub published_at: Option<String>,
    /// Creation time.
    pub created_at: Option<String>,
}

impl StorySummary {
    /// Builds the catalogue entry for `record` stored in `folder`.
    #[must_use]
    pub fn from_record(folder: &StoryFolder, record: &StoryRecord) -> Self {
        let created_at = text(record, "created_at");
        Self {
            folder: folder.to_string(),
            title: text(record, "title").unwrap_or_else(|| "Untitled Story".to_owned()),
            author: text(record, "author").unwrap_or_else(|| "Anonymous".to_owned()),
            description: text(record, "description")
                .unwrap_or_else(|| "No description".to_owned()),
            cover_image: text(record, "coverImage").unwrap_or_default(),
            published_at: text(record, "publishedAt").or_else(|| created_at.clone()),
            created_at,
        }
    }

    fn published_instant(&self) -> Option<DateTime<Utc>> {
        self.published_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Sorts catalogue entries newest first. Entries without a parseable publish
/// time go last, in folder order.
pub fn sort_newest_first(stories: &mut [StorySummary]) {
    stories.sort_by(|a, b| {
        b.published_instant()
            .cmp(&a.published_instant())
            .then_with(|| a.folder.cmp(&b.folder))
    });
}

/// Metadata of a single published story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDetail {
    /// Title.
    pub title: Option<String>,
    /// Author.
    pub author: Option<String>,
    /// Blurb.
    pub description: Option<String>,
    /// Cover image URL.
    pub cover_image: Option<String>,
    /// Publish time.
    pub published_at: Option<String>,
    /// Creation time.
    pub created_at: Option<String>,
}

impl StoryDetail {
    /// Extracts the detail view of `record`.
    #[must_use]
    pub fn from_record(record: &StoryRecord) -> Self {
        let raw = |key: &str| record.get(key).and_then(Value::as_str).map(str::to_owned);
        Self {
            title: raw("title"),
            author: raw("author"),
            description: raw("description"),
            cover_image: raw("coverImage"),
            published_at: raw("publishedAt"),
            created_at: raw("created_at"),
        }
    }
}
