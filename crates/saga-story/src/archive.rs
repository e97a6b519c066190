//! Story archive abstraction and its filesystem implementation.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use saga_core::error::DomainError;
use tracing::{debug, warn};

use crate::domain::folder::StoryFolder;
use crate::domain::record::StoryRecord;

/// File holding a story's prompt, config, and publish metadata.
pub const DATA_FILE: &str = "story_data.json";

/// File holding a story's Markdown export.
pub const MARKDOWN_FILE: &str = "story.md";

/// Highest numeric suffix tried when a timestamped folder name is taken.
const MAX_SUFFIX: u32 = 1000;

/// Storage for story folders.
#[async_trait]
pub trait StoryArchive: Send + Sync {
    /// Creates a new, empty folder named `preferred`, or `preferred_2`,
    /// `preferred_3`, ... when that name is taken. Returns the name used.
    async fn create_folder(&self, preferred: &StoryFolder) -> Result<StoryFolder, DomainError>;

    /// Reads `story_data.json`, or `None` when the folder has none.
    async fn read_record(&self, folder: &StoryFolder) -> Result<Option<StoryRecord>, DomainError>;

    /// Writes `story_data.json`, pretty-printed.
    async fn write_record(
        &self,
        folder: &StoryFolder,
        record: &StoryRecord,
    ) -> Result<(), DomainError>;

    /// Writes `story.md`, creating the folder when needed.
    async fn write_markdown(&self, folder: &StoryFolder, markdown: &str)
    -> Result<(), DomainError>;

    /// Reads `story.md`, or `None` when the folder has none.
    async fn read_markdown(&self, folder: &StoryFolder) -> Result<Option<String>, DomainError>;

    /// Lists every story folder.
    async fn list_folders(&self) -> Result<Vec<StoryFolder>, DomainError>;
}

/// Story archive rooted at a data directory, one sub-directory per story.
#[derive(Debug, Clone)]
pub struct FsStoryArchive {
    data_dir: PathBuf,
}

impl FsStoryArchive {
    /// Creates an archive rooted at `data_dir`. The directory is created on
    /// first write.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path_of(&self, folder: &StoryFolder) -> PathBuf {
        self.data_dir.join(folder.as_str())
    }

    async fn read_optional(path: PathBuf) -> Result<Option<Vec<u8>>, DomainError> {
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl StoryArchive for FsStoryArchive {
    async fn create_folder(&self, preferred: &StoryFolder) -> Result<StoryFolder, DomainError> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        let mut candidate = preferred.clone();
        for suffix in 2..=MAX_SUFFIX {
            match tokio::fs::create_dir(self.path_of(&candidate)).await {
                Ok(()) => {
                    debug!(folder = %candidate, "story folder created");
                    return Ok(candidate);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    candidate = preferred.with_suffix(suffix);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(DomainError::Infrastructure(format!(
            "no free folder name for {preferred}"
        )))
    }

    async fn read_record(&self, folder: &StoryFolder) -> Result<Option<StoryRecord>, DomainError> {
        let Some(bytes) = Self::read_optional(self.path_of(folder).join(DATA_FILE)).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn write_record(
        &self,
        folder: &StoryFolder,
        record: &StoryRecord,
    ) -> Result<(), DomainError> {
        let body = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(self.path_of(folder).join(DATA_FILE), body).await?;
        Ok(())
    }

    async fn write_markdown(
        &self,
        folder: &StoryFolder,
        markdown: &str,
    ) -> Result<(), DomainError> {
        let dir = self.path_of(folder);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(MARKDOWN_FILE), markdown).await?;
        Ok(())
    }

    async fn read_markdown(&self, folder: &StoryFolder) -> Result<Option<String>, DomainError> {
        let Some(bytes) = Self::read_optional(self.path_of(folder).join(MARKDOWN_FILE)).await?
        else {
            return Ok(None);
        };
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| DomainError::Infrastructure(format!("story.md is not UTF-8: {e}")))
    }

    async fn list_folders(&self) -> Result<Vec<StoryFolder>, DomainError> {
        let mut entries = match tokio::fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut folders = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            match name.to_str().map(StoryFolder::parse) {
                Some(Ok(folder)) => folders.push(folder),
                _ => warn!(name = ?name, "skipping unusable story folder name"),
            }
        }
        folders.sort();
        Ok(folders)
    }
}
