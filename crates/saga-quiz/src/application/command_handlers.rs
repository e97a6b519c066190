//! Command handlers for the quiz context.
//!
//! Handlers validate the command, update the character repository and the
//! character folder, and return what the HTTP layer reports back.

use std::path::{Component, Path, PathBuf};

use saga_core::error::DomainError;
use saga_core::gateway::{QuestionRequest, QuizGateway};
use tracing::{info, warn};

use crate::assets;
use crate::domain::character::{Character, CharacterDraft, image_extension, validate_name};
use crate::domain::commands::{DeleteCharacter, GenerateQuestions, SetVisibility, UploadCharacter};
use crate::domain::question::validate_questions;
use crate::repository::CharacterRepository;

/// Image generation still to be done for a freshly uploaded character.
#[derive(Debug, Clone)]
pub struct RevealJob {
    /// The character the images belong to.
    pub character_id: u32,
    /// Uploader's generation API key.
    pub api_key: String,
    /// One prompt per reveal stage, in order.
    pub prompts: Vec<String>,
    /// Base image every prompt edits.
    pub original_image: PathBuf,
    /// Folder the generated images are written to.
    pub folder: PathBuf,
    /// Extension given to generated images, including the dot.
    pub image_ext: String,
}

/// Result of a successful upload.
#[derive(Debug)]
pub struct UploadOutcome {
    /// The stored character.
    pub character: Character,
    /// Background work to start, if any prompts were given.
    pub reveal_job: Option<RevealJob>,
}

/// Handles the `UploadCharacter` command: validates the optional question
/// set, registers the character, and writes its base image and questions.
///
/// Image generation is not awaited; the caller runs the returned
/// `RevealJob` in the background.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an empty name, a missing image, or
/// an invalid question set (checked before anything is written), and
/// `DomainError::Infrastructure` if storage fails.
pub async fn handle_upload_character(
    command: &UploadCharacter,
    repo: &dyn CharacterRepository,
) -> Result<UploadOutcome, DomainError> {
    if command.name.trim().is_empty() {
        return Err(DomainError::Validation(
            "character name must not be empty".into(),
        ));
    }
    validate_name(&command.name)?;
    if command.image.is_empty() {
        return Err(DomainError::Validation("image file is required".into()));
    }

    let questions = command
        .questions_json
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(validate_questions)
        .transpose()?;
    if let Some(questions) = &questions {
        info!(count = questions.len(), "question set validated");
    }

    let image_ext = image_extension(command.image_file_name.as_deref());
    let character = repo
        .insert(CharacterDraft {
            name: command.name.clone(),
            image_ext: image_ext.clone(),
            owner: command.owner.clone(),
        })
        .await?;

    let folder = PathBuf::from(&character.folder);
    let original_image = PathBuf::from(&character.original_image);
    let written = async {
        tokio::fs::create_dir_all(&folder).await?;
        tokio::fs::write(&original_image, &command.image).await
    }
    .await;
    if let Err(e) = written {
        // Undo the registration so the listing never points at a missing image.
        repo.remove(character.id).await?;
        return Err(e.into());
    }

    if let Some(questions) = &questions {
        if let Err(e) = assets::write_questions(&folder, questions).await {
            warn!(character_id = character.id, error = %e, "failed to save questions");
        }
    }

    info!(
        correlation_id = %command.correlation_id,
        character_id = character.id,
        prompts = command.prompts.len(),
        "character uploaded"
    );

    let reveal_job = (!command.prompts.is_empty()).then(|| RevealJob {
        character_id: character.id,
        api_key: command.api_key.clone(),
        prompts: command.prompts.clone(),
        original_image,
        folder,
        image_ext,
    });

    Ok(UploadOutcome {
        character,
        reveal_job,
    })
}

/// Runs a `RevealJob`: each prompt edits the original image, and the result
/// is stored as `<n><ext>` where `n` is the 1-based prompt number. Failed
/// prompts are logged and skipped. Returns the number of images stored.
pub async fn run_reveal_job(job: RevealJob, gateway: &dyn QuizGateway) -> usize {
    let source = match assets::read_data_uri(&job.original_image).await {
        Ok(uri) => uri,
        Err(e) => {
            warn!(character_id = job.character_id, error = %e, "cannot read original image");
            return 0;
        }
    };

    let total = job.prompts.len();
    let mut stored = 0;
    for (idx, prompt) in job.prompts.iter().enumerate() {
        let stage = idx + 1;
        info!(character_id = job.character_id, stage, total, "generating reveal image");

        let url = match gateway.edit_image(&job.api_key, &source, prompt).await {
            Ok(Some(url)) => url,
            Ok(None) => {
                warn!(character_id = job.character_id, stage, "prompt produced no image, skipping");
                continue;
            }
            Err(e) => {
                warn!(character_id = job.character_id, stage, error = %e, "image edit failed, skipping");
                continue;
            }
        };

        let target = job.folder.join(format!("{stage}{}", job.image_ext));
        let saved = match gateway.download(&url).await {
            Ok(bytes) => tokio::fs::write(&target, &bytes).await.map_err(DomainError::from),
            Err(e) => Err(e),
        };
        match saved {
            Ok(()) => {
                stored += 1;
                info!(character_id = job.character_id, path = %target.display(), "reveal image saved");
            }
            Err(e) => {
                warn!(character_id = job.character_id, stage, error = %e, "failed to store image");
            }
        }
    }
    stored
}

/// Whether `folder` is a direct child of `uploads_dir`, both as written and
/// once symlinks are resolved.
async fn is_character_folder(folder: &Path, uploads_dir: &Path) -> bool {
    let Ok(rest) = folder.strip_prefix(uploads_dir) else {
        return false;
    };
    let mut components = rest.components();
    if !matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) {
        return false;
    }
    match (
        tokio::fs::canonicalize(folder).await,
        tokio::fs::canonicalize(uploads_dir).await,
    ) {
        (Ok(real), Ok(root)) => real.parent() == Some(root.as_path()),
        // Nothing on disk to delete, or nothing to resolve against.
        _ => true,
    }
}

/// Handles the `DeleteCharacter` command: removes the record, then the
/// folder. A folder that cannot be removed is logged, not reported.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown id.
pub async fn handle_delete_character(
    command: &DeleteCharacter,
    repo: &dyn CharacterRepository,
) -> Result<Character, DomainError> {
    let removed = repo
        .remove(command.character_id)
        .await?
        .ok_or_else(|| DomainError::NotFound("Character not found".into()))?;

    let folder = PathBuf::from(&removed.folder);
    if !removed.folder.is_empty() && !is_character_folder(&folder, repo.uploads_dir()).await {
        warn!(path = %folder.display(), "refusing to delete folder outside the uploads directory");
    } else if !removed.folder.is_empty() && tokio::fs::try_exists(&folder).await.unwrap_or(false) {
        match tokio::fs::remove_dir_all(&folder).await {
            Ok(()) => info!(path = %folder.display(), "character folder deleted"),
            Err(e) => warn!(path = %folder.display(), error = %e, "failed to delete character folder"),
        }
    }

    info!(correlation_id = %command.correlation_id, character_id = removed.id, "character deleted");
    Ok(removed)
}

/// Handles the `SetVisibility` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown id.
pub async fn handle_set_visibility(
    command: &SetVisibility,
    repo: &dyn CharacterRepository,
) -> Result<Character, DomainError> {
    let updated = repo
        .set_visibility(command.character_id, command.visibility)
        .await?
        .ok_or_else(|| DomainError::NotFound("Character not found".into()))?;

    info!(
        correlation_id = %command.correlation_id,
        character_id = updated.id,
        status = updated.status.as_str(),
        "character visibility changed"
    );
    Ok(updated)
}

/// Handles the `GenerateQuestions` command by delegating to the
/// question-writing agent.
///
/// # Errors
///
/// Returns `DomainError::Validation` for an empty topic or a zero count, and
/// whatever the gateway reports otherwise.
pub async fn handle_generate_questions(
    command: &GenerateQuestions,
    gateway: &dyn QuizGateway,
) -> Result<Vec<serde_json::Value>, DomainError> {
    if command.topic.trim().is_empty() {
        return Err(DomainError::Validation("topic must not be empty".into()));
    }
    if command.num_questions == 0 {
        return Err(DomainError::Validation(
            "num_questions must be greater than zero".into(),
        ));
    }

    let request = QuestionRequest {
        topic: command.topic.clone(),
        difficulties: command.difficulties.clone(),
        num_questions: command.num_questions,
    };
    let questions = gateway.generate_questions(&command.api_key, &request).await?;
    info!(correlation_id = %command.correlation_id, count = questions.len(), "questions generated");
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use saga_core::error::DomainError;
    use saga_test_support::StubQuizGateway;
    use uuid::Uuid;

    use super::*;
    use crate::domain::character::Visibility;
    use crate::repository::FileCharacterRepository;

    fn repo_in(dir: &Path) -> FileCharacterRepository {
        FileCharacterRepository::new(dir.join("characters.json"), dir.join("uploads"))
    }

    fn upload(questions_json: Option<&str>, prompts: &[&str]) -> UploadCharacter {
        UploadCharacter {
            correlation_id: Uuid::new_v4(),
            name: "Mira Vale".to_owned(),
            owner: Some("user_9".to_owned()),
            api_key: "key-123".to_owned(),
            prompts: prompts.iter().map(|p| (*p).to_owned()).collect(),
            image_file_name: Some("mira.jpg".to_owned()),
            image: vec![1, 2, 3],
            questions_json: questions_json.map(str::to_owned),
        }
    }

    const QUESTIONS: &str =
        r#"[{"id": 7, "question": "q", "options": ["a","b","c","d"], "answer": "c"}]"#;

    #[tokio::test]
    async fn test_upload_writes_image_questions_and_private_record() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(dir.path());
        let command = upload(Some(QUESTIONS), &["smile"]);

        // Act
        let outcome = handle_upload_character(&command, &repo).await.unwrap();

        // Assert
        let character = outcome.character;
        assert_eq!(character.id, 1);
        assert_eq!(character.owner, "user_9");
        assert_eq!(character.status, Visibility::Private);
        assert!(character.folder.ends_with("1_mira_vale"));
        assert_eq!(std::fs::read(&character.original_image).unwrap(), vec![1, 2, 3]);

        let questions = assets::load_questions(Path::new(&character.folder)).await.unwrap();
        assert_eq!(questions[0].id, 1);

        let job = outcome.reveal_job.unwrap();
        assert_eq!(job.prompts, vec!["smile".to_owned()]);
        assert_eq!(job.image_ext, ".jpg");
    }

    #[tokio::test]
    async fn test_upload_with_invalid_questions_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(dir.path());
        let command = upload(Some(r#"[{"id": 1}]"#), &[]);

        let result = handle_upload_character(&command, &repo).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(repo.load_all().await.unwrap().is_empty());
        assert!(!dir.path().join("uploads").exists());
    }

    #[tokio::test]
    async fn test_upload_without_prompts_has_no_job() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(dir.path());

        let outcome = handle_upload_character(&upload(None, &[]), &repo).await.unwrap();

        assert!(outcome.reveal_job.is_none());
    }

    #[tokio::test]
    async fn test_upload_without_image_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(dir.path());
        let mut command = upload(None, &[]);
        command.image.clear();

        let result = handle_upload_character(&command, &repo).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_reveal_job_stores_numbered_images_and_skips_failures() {
        // Arrange: the second prompt yields no image.
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(dir.path());
        let outcome = handle_upload_character(&upload(None, &["a", "b", "c"]), &repo)
            .await
            .unwrap();
        let gateway = Arc::new(StubQuizGateway::new(
            vec![
                Some("https://img/1".to_owned()),
                None,
                Some("https://img/3".to_owned()),
            ],
            b"generated".to_vec(),
        ));

        // Act
        let stored = run_reveal_job(outcome.reveal_job.unwrap(), gateway.as_ref()).await;

        // Assert
        let folder = Path::new(&outcome.character.folder);
        assert_eq!(stored, 2);
        assert_eq!(std::fs::read(folder.join("1.jpg")).unwrap(), b"generated");
        assert!(!folder.join("2.jpg").exists());
        assert!(folder.join("3.jpg").exists());

        let calls = gateway.edit_calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|(key, image, _)| key == "key-123"
            && image == "data:image/jpeg;base64,AQID"));
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_folder() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(dir.path());
        let created = handle_upload_character(&upload(None, &[]), &repo)
            .await
            .unwrap()
            .character;

        let command = DeleteCharacter {
            correlation_id: Uuid::new_v4(),
            character_id: created.id,
        };
        let removed = handle_delete_character(&command, &repo).await.unwrap();

        assert_eq!(removed.id, created.id);
        assert!(!Path::new(&created.folder).exists());
        assert!(repo.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_with_traversal_name_writes_nothing() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(dir.path());
        let mut command = upload(None, &["smile"]);
        command.name = "../../../escaped".to_owned();

        // Act
        let result = handle_upload_character(&command, &repo).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(repo.load_all().await.unwrap().is_empty());
        assert!(!dir.path().join("escaped").exists());
        assert!(!dir.path().join("uploads").exists());
    }

    #[tokio::test]
    async fn test_delete_keeps_folder_outside_uploads() {
        // Arrange: a stored record whose folder points outside `uploads/`.
        let dir = tempfile::tempdir().unwrap();
        let victim = dir.path().join("victim");
        std::fs::create_dir_all(&victim).unwrap();
        std::fs::write(victim.join("keep.txt"), "keep").unwrap();
        let folder = dir.path().join("uploads").join("1_x").join("..").join("..").join("victim");
        let record = serde_json::json!([{
            "id": 1,
            "name": "x",
            "original_image": folder.join("0.png").to_string_lossy(),
            "folder": folder.to_string_lossy(),
            "owner": "u1",
            "status": "private"
        }]);
        std::fs::write(dir.path().join("characters.json"), record.to_string()).unwrap();
        let repo = repo_in(dir.path());
        let command = DeleteCharacter {
            correlation_id: Uuid::new_v4(),
            character_id: 1,
        };

        // Act
        let removed = handle_delete_character(&command, &repo).await.unwrap();

        // Assert
        assert_eq!(removed.id, 1);
        assert!(victim.join("keep.txt").exists());
        assert!(repo.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_character_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(dir.path());
        let command = DeleteCharacter {
            correlation_id: Uuid::new_v4(),
            character_id: 42,
        };

        let result = handle_delete_character(&command, &repo).await;

        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_visibility_makes_character_public() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(dir.path());
        let created = handle_upload_character(&upload(None, &[]), &repo)
            .await
            .unwrap()
            .character;

        let command = SetVisibility {
            correlation_id: Uuid::new_v4(),
            character_id: created.id,
            visibility: Visibility::Public,
        };
        let updated = handle_set_visibility(&command, &repo).await.unwrap();

        assert_eq!(updated.status, Visibility::Public);
    }

    #[tokio::test]
    async fn test_generate_questions_passes_request_to_gateway() {
        let gateway = StubQuizGateway::new(vec![], Vec::new())
            .with_questions(vec![serde_json::json!({ "id": 1 })]);
        let command = GenerateQuestions {
            correlation_id: Uuid::new_v4(),
            api_key: "k".to_owned(),
            topic: "space".to_owned(),
            difficulties: vec![1, 2],
            num_questions: 3,
        };

        let questions = handle_generate_questions(&command, &gateway).await.unwrap();

        assert_eq!(questions.len(), 1);
        let requests = gateway.question_requests();
        assert_eq!(requests[0].topic, "space");
        assert_eq!(requests[0].num_questions, 3);
    }

    #[tokio::test]
    async fn test_generate_questions_rejects_zero_count() {
        let gateway = StubQuizGateway::new(vec![], Vec::new());
        let command = GenerateQuestions {
            correlation_id: Uuid::new_v4(),
            api_key: "k".to_owned(),
            topic: "space".to_owned(),
            difficulties: vec![],
            num_questions: 0,
        };

        let result = handle_generate_questions(&command, &gateway).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
