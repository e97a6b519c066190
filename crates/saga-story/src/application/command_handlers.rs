//! Command handlers for the story context.

use saga_core::clock::Clock;
use saga_core::error::DomainError;
use serde_json::{Map, Value};
use tracing::info;

use crate::archive::StoryArchive;
use crate::domain::commands::{ExportStory, PublishStory, SaveStory};
use crate::domain::folder::StoryFolder;
use crate::domain::record::{StoryRecord, iso_timestamp};

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64().is_none_or(|f| f == 0.0),
        Some(_) => false,
    }
}

fn required<'a>(value: Option<&'a String>) -> Option<&'a str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

fn into_object(value: Option<Value>, what: &str) -> Result<Map<String, Value>, DomainError> {
    match value {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(DomainError::Validation(format!("{what} must be an object"))),
    }
}

/// Handles the `SaveStory` command: creates a timestamped story folder and
/// writes `story_data.json` holding the prompt, the config, and a creation
/// time. Prompt and config get their own `created_at` unless they carry one.
///
/// # Errors
///
/// Returns `DomainError::Validation` when `prompt.prompt_text` is missing or
/// empty, and `DomainError::Infrastructure` if the folder cannot be written.
pub async fn handle_save_story(
    command: &SaveStory,
    clock: &dyn Clock,
    archive: &dyn StoryArchive,
) -> Result<StoryFolder, DomainError> {
    let prompt_text = command.prompt.as_ref().and_then(|p| p.get("prompt_text"));
    if is_blank(prompt_text) {
        return Err(DomainError::Validation("Missing prompt_text".into()));
    }
    let mut prompt = into_object(command.prompt.clone(), "prompt")?;
    let mut config = into_object(command.config.clone(), "config")?;

    let now = clock.now();
    let stamp = Value::String(iso_timestamp(now));
    for section in [&mut prompt, &mut config] {
        if is_blank(section.get("created_at")) {
            section.insert("created_at".to_owned(), stamp.clone());
        }
    }

    let mut record = StoryRecord::new();
    record.insert("prompt".to_owned(), Value::Object(prompt));
    record.insert("config".to_owned(), Value::Object(config));
    record.insert("created_at".to_owned(), stamp);

    let folder = archive
        .create_folder(&StoryFolder::timestamped(now))
        .await?;
    archive.write_record(&folder, &record).await?;

    info!(correlation_id = %command.correlation_id, folder = %folder, "story saved");
    Ok(folder)
}

/// Handles the `ExportStory` command: writes the Markdown export into the
/// story folder, creating the folder when it does not exist yet.
///
/// # Errors
///
/// Returns `DomainError::Validation` when the folder or the Markdown is
/// missing or the folder name is unsafe.
pub async fn handle_export_story(
    command: &ExportStory,
    archive: &dyn StoryArchive,
) -> Result<StoryFolder, DomainError> {
    let (Some(folder), Some(markdown)) = (
        required(command.story_folder.as_ref()),
        required(command.markdown.as_ref()),
    ) else {
        return Err(DomainError::Validation(
            "Missing storyFolder or markdown".into(),
        ));
    };
    let folder = StoryFolder::parse(folder)?;

    archive.write_markdown(&folder, markdown).await?;

    info!(
        correlation_id = %command.correlation_id,
        folder = %folder,
        bytes = markdown.len(),
        "story markdown exported"
    );
    Ok(folder)
}

/// Handles the `PublishStory` command: marks a saved story as published and
/// records its catalogue metadata.
///
/// # Errors
///
/// Returns `DomainError::Validation` when a required field is missing and
/// `DomainError::NotFound` when the folder holds no saved story.
pub async fn handle_publish_story(
    command: &PublishStory,
    clock: &dyn Clock,
    archive: &dyn StoryArchive,
) -> Result<StoryFolder, DomainError> {
    let (Some(folder), Some(title), Some(author), Some(description)) = (
        required(command.story_folder.as_ref()),
        required(command.title.as_ref()),
        required(command.author.as_ref()),
        required(command.description.as_ref()),
    ) else {
        return Err(DomainError::Validation("Missing required fields".into()));
    };
    let folder = StoryFolder::parse(folder)?;

    let mut record = archive
        .read_record(&folder)
        .await?
        .ok_or_else(|| DomainError::NotFound("Story data not found".into()))?;

    record.insert("published".to_owned(), Value::Bool(true));
    record.insert("title".to_owned(), Value::String(title.to_owned()));
    record.insert("author".to_owned(), Value::String(author.to_owned()));
    record.insert(
        "description".to_owned(),
        Value::String(description.to_owned()),
    );
    record.insert(
        "coverImage".to_owned(),
        Value::String(command.cover_image.clone().unwrap_or_default()),
    );
    record.insert(
        "publishedAt".to_owned(),
        Value::String(iso_timestamp(clock.now())),
    );
    archive.write_record(&folder, &record).await?;

    info!(correlation_id = %command.correlation_id, folder = %folder, "story published");
    Ok(folder)
}
