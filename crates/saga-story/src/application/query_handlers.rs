//! Query handlers for the story context.

use saga_core::error::DomainError;
use tracing::warn;

use crate::archive::StoryArchive;
use crate::domain::folder::StoryFolder;
use crate::domain::record::{StoryDetail, StorySummary, is_published, sort_newest_first};

/// Lists published stories, newest first. Folders whose record cannot be
/// read are skipped.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the data directory cannot be
/// listed.
pub async fn list_published_stories(
    archive: &dyn StoryArchive,
) -> Result<Vec<StorySummary>, DomainError> {
    let mut stories = Vec::new();
    for folder in archive.list_folders().await? {
        match archive.read_record(&folder).await {
            Ok(Some(record)) if is_published(&record) => {
                stories.push(StorySummary::from_record(&folder, &record));
            }
            Ok(_) => {}
            Err(e) => warn!(folder = %folder, error = %e, "skipping unreadable story"),
        }
    }
    sort_newest_first(&mut stories);
    Ok(stories)
}

/// Returns the catalogue metadata of one published story.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an unsafe folder name,
/// `DomainError::NotFound` when the story does not exist, and
/// `DomainError::Forbidden` when it exists but is not published.
pub async fn get_story(archive: &dyn StoryArchive, folder: &str) -> Result<StoryDetail, DomainError> {
    let folder = StoryFolder::parse(folder)?;
    let record = archive
        .read_record(&folder)
        .await?
        .ok_or_else(|| DomainError::NotFound("Story not found".into()))?;
    if !is_published(&record) {
        return Err(DomainError::Forbidden("Story not published".into()));
    }
    Ok(StoryDetail::from_record(&record))
}

/// Returns the Markdown export of a story.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an unsafe folder name and
/// `DomainError::NotFound` when the story has no export.
pub async fn get_story_content(
    archive: &dyn StoryArchive,
    folder: &str,
) -> Result<String, DomainError> {
    let folder = StoryFolder::parse(folder)?;
    archive
        .read_markdown(&folder)
        .await?
        .ok_or_else(|| DomainError::NotFound("Story content not found".into()))
}
