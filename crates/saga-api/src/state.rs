//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use saga_core::clock::Clock;
use saga_core::gateway::{QuizGateway, StoryGateway};
use saga_quiz::admin::PasswordFile;
use saga_quiz::repository::CharacterRepository;
use saga_story::archive::StoryArchive;

/// State shared across the quiz server's request handlers.
#[derive(Clone)]
pub struct QuizState {
    /// Character storage.
    pub repository: Arc<dyn CharacterRepository>,
    /// Image-edit and question-writing calls.
    pub gateway: Arc<dyn QuizGateway>,
    /// Admin password check.
    pub password: PasswordFile,
    /// Suggested prompts file.
    pub prompts_file: PathBuf,
}

impl QuizState {
    /// Create new quiz state.
    #[must_use]
    pub fn new(
        repository: Arc<dyn CharacterRepository>,
        gateway: Arc<dyn QuizGateway>,
        password: PasswordFile,
        prompts_file: PathBuf,
    ) -> Self {
        Self {
            repository,
            gateway,
            password,
            prompts_file,
        }
    }
}

/// State shared across the story server's request handlers.
#[derive(Clone)]
pub struct StoryState {
    /// Clock used for folder names and timestamps.
    pub clock: Arc<dyn Clock>,
    /// Story folder storage.
    pub archive: Arc<dyn StoryArchive>,
    /// Text and image generation calls.
    pub gateway: Arc<dyn StoryGateway>,
}

impl StoryState {
    /// Create new story state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        archive: Arc<dyn StoryArchive>,
        gateway: Arc<dyn StoryGateway>,
    ) -> Self {
        Self {
            clock,
            archive,
            gateway,
        }
    }
}
