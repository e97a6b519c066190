//! Query handlers for the quiz context.
//!
//! Listings, the question/answer game flow, and suggested prompts. None of
//! these mutate state.

use std::path::{Path, PathBuf};

use saga_core::error::DomainError;
use serde::Serialize;
use tracing::warn;

use crate::assets;
use crate::domain::character::Character;
use crate::domain::listing::{Platform, SortOrder, paginate};
use crate::domain::question::Question;
use crate::repository::CharacterRepository;

const COMPLETED_MESSAGE: &str = "You have completed the game!";
const WRONG_MESSAGE: &str = "Wrong answer! Game Over.";
const WON_MESSAGE: &str = "Congratulations! You won!";

/// A character as shown on a listing card.
#[derive(Debug, Clone, Serialize)]
pub struct CharacterCard {
    /// The stored record.
    #[serde(flatten)]
    pub character: Character,
    /// The base image as a data URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One page of a character listing.
#[derive(Debug, Clone, Serialize)]
pub struct CharacterListing {
    /// Cards on this page.
    pub characters: Vec<CharacterCard>,
    /// Number of characters in the whole (filtered) listing.
    pub total: usize,
    /// Number of cards actually returned.
    pub limit: usize,
    /// Offset requested.
    pub offset: usize,
    /// Platform as sent by the client.
    pub platform: String,
    /// Sort key as sent by the client (admin listing only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

async fn to_cards(characters: Vec<Character>) -> Vec<CharacterCard> {
    let mut cards = Vec::with_capacity(characters.len());
    for character in characters {
        let image = if character.original_image.is_empty() {
            None
        } else {
            match assets::read_data_uri(Path::new(&character.original_image)).await {
                Ok(uri) => Some(uri),
                Err(e) => {
                    warn!(character_id = character.id, error = %e, "original image unreadable");
                    None
                }
            }
        };
        cards.push(CharacterCard { character, image });
    }
    cards
}

/// Lists the characters a player may pick: public ones and those the player
/// uploaded.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the repository cannot be read.
pub async fn list_visible_characters(
    repo: &dyn CharacterRepository,
    user_id: Option<&str>,
    offset: usize,
    platform: &str,
) -> Result<CharacterListing, DomainError> {
    let visible: Vec<Character> = repo
        .load_all()
        .await?
        .into_iter()
        .filter(|c| c.is_visible_to(user_id))
        .collect();
    let page = paginate(visible, offset, Platform::parse(platform).page_limit());

    Ok(CharacterListing {
        characters: to_cards(page.items).await,
        total: page.total,
        limit: page.limit,
        offset: page.offset,
        platform: platform.to_owned(),
        sort: None,
    })
}

/// Lists every character for the admin panel, sorted before paging.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the repository cannot be read.
pub async fn list_all_characters(
    repo: &dyn CharacterRepository,
    offset: usize,
    platform: &str,
    sort: &str,
) -> Result<CharacterListing, DomainError> {
    let mut characters = repo.load_all().await?;
    SortOrder::parse(sort).apply(&mut characters);
    let page = paginate(characters, offset, Platform::parse(platform).page_limit());

    Ok(CharacterListing {
        characters: to_cards(page.items).await,
        total: page.total,
        limit: page.limit,
        offset: page.offset,
        platform: platform.to_owned(),
        sort: Some(sort.to_owned()),
    })
}

/// Every question has been answered.
#[derive(Debug, Clone, Serialize)]
pub struct GameCompleted {
    /// Always `true`.
    pub done: bool,
    /// Completion message.
    pub message: String,
}

/// A question to show, with the image revealed so far.
#[derive(Debug, Clone, Serialize)]
pub struct OpenQuestion {
    /// The question.
    pub question: Question,
    /// Image for this stage as a data URI.
    pub image: Option<String>,
    /// Name of the character being played.
    pub character_name: String,
}

/// Response to a question request.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum QuestionView {
    /// The requested id is past the last question.
    Completed(GameCompleted),
    /// The requested question.
    Open(OpenQuestion),
}

/// The answer was wrong.
#[derive(Debug, Clone, Serialize)]
pub struct WrongAnswer {
    /// Always `false`.
    pub correct: bool,
    /// Feedback message.
    pub message: String,
}

/// The answer was right and another question follows.
#[derive(Debug, Clone, Serialize)]
pub struct NextStage {
    /// Always `true`.
    pub correct: bool,
    /// The next question.
    pub next_question: Question,
    /// Image unlocked by the answer.
    pub next_image: Option<String>,
}

/// The answer was right and it was the last one.
#[derive(Debug, Clone, Serialize)]
pub struct Victory {
    /// Always `true`.
    pub correct: bool,
    /// Congratulation message.
    pub message: String,
    /// Always `None`; present so clients can test for it.
    pub next_question: Option<Question>,
    /// The fully revealed image.
    pub next_image: Option<String>,
}

/// Response to a submitted answer.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnswerView {
    /// Wrong answer.
    Wrong(WrongAnswer),
    /// Right answer, game continues.
    Next(NextStage),
    /// Right answer, game won.
    Won(Victory),
}

async fn find_character(
    repo: &dyn CharacterRepository,
    character_id: u32,
) -> Result<Character, DomainError> {
    repo.load_all()
        .await?
        .into_iter()
        .find(|c| c.id == character_id)
        .ok_or_else(|| DomainError::NotFound("Character not found!".into()))
}

async fn image_at(images: &[PathBuf], index: usize) -> Option<String> {
    let path = images.get(index)?;
    match assets::read_data_uri(path).await {
        Ok(uri) => Some(uri),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "reveal image unreadable");
            None
        }
    }
}

/// Returns question `question_id` (1-based) of a character together with
/// the matching reveal image, or a completion marker past the last one.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown character, a character
/// without questions, or question id 0.
pub async fn get_question(
    repo: &dyn CharacterRepository,
    character_id: u32,
    question_id: u32,
) -> Result<QuestionView, DomainError> {
    let character = find_character(repo, character_id).await?;
    let folder = PathBuf::from(&character.folder);
    let questions = assets::load_questions(&folder).await?;

    let index = stage_index(question_id)?;
    let Some(question) = questions.get(index).cloned() else {
        return Ok(QuestionView::Completed(GameCompleted {
            done: true,
            message: COMPLETED_MESSAGE.to_owned(),
        }));
    };

    let images = assets::list_images(&folder).await?;
    Ok(QuestionView::Open(OpenQuestion {
        question,
        image: image_at(&images, index).await,
        character_name: character.name,
    }))
}

fn stage_index(question_id: u32) -> Result<usize, DomainError> {
    question_id
        .checked_sub(1)
        .and_then(|i| usize::try_from(i).ok())
        .ok_or_else(|| DomainError::NotFound(format!("question {question_id} not found")))
}

/// Judges an answer. A right answer unlocks the next image; when no
/// question or no image remains, the last image is returned as the prize.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown character, a character
/// without questions, or a question id outside the set.
pub async fn submit_answer(
    repo: &dyn CharacterRepository,
    character_id: u32,
    question_id: u32,
    answer: &str,
) -> Result<AnswerView, DomainError> {
    let character = find_character(repo, character_id).await?;
    let folder = PathBuf::from(&character.folder);
    let questions = assets::load_questions(&folder).await?;

    let index = stage_index(question_id)?;
    let question = questions
        .get(index)
        .ok_or_else(|| DomainError::NotFound(format!("question {question_id} not found")))?;

    if !question.is_correct(answer) {
        return Ok(AnswerView::Wrong(WrongAnswer {
            correct: false,
            message: WRONG_MESSAGE.to_owned(),
        }));
    }

    let images = assets::list_images(&folder).await?;
    // The next stage shows image `next - 1`; image 0 is the untouched original.
    let next = index + 2;
    if next > questions.len() || next >= images.len() {
        let last = images.len().checked_sub(1);
        let next_image = match last {
            Some(i) => image_at(&images, i).await,
            None => None,
        };
        return Ok(AnswerView::Won(Victory {
            correct: true,
            message: WON_MESSAGE.to_owned(),
            next_question: None,
            next_image,
        }));
    }

    Ok(AnswerView::Next(NextStage {
        correct: true,
        next_question: questions[next - 1].clone(),
        next_image: image_at(&images, next - 1).await,
    }))
}

/// Loads the suggested image prompts shown on the upload page. A missing or
/// malformed file yields an empty list.
pub async fn load_suggested_prompts(path: &Path) -> Vec<serde_json::Value> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read suggested prompts");
            return Vec::new();
        }
    };
    match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(serde_json::Value::Array(prompts)) => prompts,
        Ok(_) => {
            warn!(path = %path.display(), "suggested prompts file is not an array");
            Vec::new()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot parse suggested prompts");
            Vec::new()
        }
    }
}
