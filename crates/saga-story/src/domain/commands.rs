//! Commands for the story context.

use serde_json::Value;
use uuid::Uuid;

/// Command to save a new story's prompt and generation config.
#[derive(Debug, Clone)]
pub struct SaveStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Prompt object; must carry a non-empty `prompt_text`.
    pub prompt: Option<Value>,
    /// Generation config object.
    pub config: Option<Value>,
}

/// Command to store the Markdown export of a story.
#[derive(Debug, Clone)]
pub struct ExportStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Target story folder.
    pub story_folder: Option<String>,
    /// Markdown text.
    pub markdown: Option<String>,
}

/// Command to publish a saved story.
#[derive(Debug, Clone)]
pub struct PublishStory {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Story folder to publish.
    pub story_folder: Option<String>,
    /// Title shown in the catalogue.
    pub title: Option<String>,
    /// Author shown in the catalogue.
    pub author: Option<String>,
    /// Blurb shown in the catalogue.
    pub description: Option<String>,
    /// Cover image URL; empty when absent.
    pub cover_image: Option<String>,
}
