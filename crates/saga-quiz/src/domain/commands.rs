//! Commands for the quiz context.

use uuid::Uuid;

use super::character::Visibility;

/// Command to create a character from an uploaded base image.
#[derive(Debug, Clone)]
pub struct UploadCharacter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Display name.
    pub name: String,
    /// Uploader's user id, from the `x-user-id` header.
    pub owner: Option<String>,
    /// Generation API key supplied by the uploader.
    pub api_key: String,
    /// One image-edit prompt per reveal stage.
    pub prompts: Vec<String>,
    /// File name of the uploaded image, used for its extension.
    pub image_file_name: Option<String>,
    /// Raw bytes of the uploaded image.
    pub image: Vec<u8>,
    /// Optional question set as raw JSON.
    pub questions_json: Option<String>,
}

/// Command to delete a character and its folder.
#[derive(Debug, Clone)]
pub struct DeleteCharacter {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The character identifier.
    pub character_id: u32,
}

/// Command to change a character's listing visibility.
#[derive(Debug, Clone)]
pub struct SetVisibility {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The character identifier.
    pub character_id: u32,
    /// The new visibility.
    pub visibility: Visibility,
}

/// Command to have the question-writing agent draft a question set.
#[derive(Debug, Clone)]
pub struct GenerateQuestions {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Generation API key supplied by the author.
    pub api_key: String,
    /// Topic of the questions.
    pub topic: String,
    /// Difficulty levels to cover.
    pub difficulties: Vec<u32>,
    /// Number of questions wanted.
    pub num_questions: u32,
}
