//! Character repository abstraction and its JSON-file implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use saga_core::error::DomainError;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::character::{Character, CharacterDraft, Visibility, next_id};

/// Repository for the character list.
#[async_trait]
pub trait CharacterRepository: Send + Sync {
    /// Loads every character in storage order.
    async fn load_all(&self) -> Result<Vec<Character>, DomainError>;

    /// Assigns the next free id to `draft`, appends it, and returns it.
    async fn insert(&self, draft: CharacterDraft) -> Result<Character, DomainError>;

    /// Removes a character, returning it, or `None` if the id is unknown.
    async fn remove(&self, character_id: u32) -> Result<Option<Character>, DomainError>;

    /// Changes a character's visibility, returning the updated record, or
    /// `None` if the id is unknown.
    async fn set_visibility(
        &self,
        character_id: u32,
        visibility: Visibility,
    ) -> Result<Option<Character>, DomainError>;

    /// Directory every character folder must live directly under.
    fn uploads_dir(&self) -> &Path;
}

/// Character repository backed by a single pretty-printed JSON array.
///
/// Writes are serialized through an async mutex and land by renaming a
/// staged copy over the file, so lock-free reads always see a whole list. A
/// missing file reads as an empty list.
#[derive(Debug)]
pub struct FileCharacterRepository {
    path: PathBuf,
    uploads_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCharacterRepository {
    /// Creates a repository over `path`. New characters get folders under
    /// `uploads_dir`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            uploads_dir: uploads_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }

    async fn read(&self) -> Result<Vec<Character>, DomainError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, characters: &[Character]) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(characters)?;
        // Readers do not take the lock, so never expose a truncated file.
        let staging = self.staging_path();
        tokio::fs::write(&staging, body).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        debug!(path = %self.path.display(), count = characters.len(), "characters saved");
        Ok(())
    }
}

#[async_trait]
impl CharacterRepository for FileCharacterRepository {
    async fn load_all(&self) -> Result<Vec<Character>, DomainError> {
        self.read().await
    }

    async fn insert(&self, draft: CharacterDraft) -> Result<Character, DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut characters = self.read().await?;
        let character = draft.into_character(next_id(&characters), &self.uploads_dir);
        characters.push(character.clone());
        self.write(&characters).await?;
        Ok(character)
    }

    async fn remove(&self, character_id: u32) -> Result<Option<Character>, DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut characters = self.read().await?;
        let Some(position) = characters.iter().position(|c| c.id == character_id) else {
            return Ok(None);
        };
        let removed = characters.remove(position);
        self.write(&characters).await?;
        Ok(Some(removed))
    }

    async fn set_visibility(
        &self,
        character_id: u32,
        visibility: Visibility,
    ) -> Result<Option<Character>, DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut characters = self.read().await?;
        let Some(character) = characters.iter_mut().find(|c| c.id == character_id) else {
            return Ok(None);
        };
        character.status = visibility;
        let updated = character.clone();
        self.write(&characters).await?;
        Ok(Some(updated))
    }

    fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> CharacterDraft {
        CharacterDraft {
            name: name.to_owned(),
            image_ext: ".png".to_owned(),
            owner: Some("user_1".to_owned()),
        }
    }

    #[tokio::test]
    async fn test_missing_file_loads_as_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileCharacterRepository::new(dir.path().join("characters.json"), dir.path());

        let characters = repo.load_all().await.unwrap();

        assert!(characters.is_empty());
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_ids_and_persists() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("characters.json");
        let repo = FileCharacterRepository::new(&path, dir.path().join("uploads"));

        // Act
        let first = repo.insert(draft("Aria")).await.unwrap();
        let second = repo.insert(draft("Bo")).await.unwrap();

        // Assert
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        let reloaded = FileCharacterRepository::new(&path, dir.path())
            .load_all()
            .await
            .unwrap();
        assert_eq!(reloaded, vec![first, second]);
    }

    #[tokio::test]
    async fn test_remove_then_insert_does_not_reuse_live_id() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileCharacterRepository::new(dir.path().join("c.json"), dir.path());
        repo.insert(draft("a")).await.unwrap();
        repo.insert(draft("b")).await.unwrap();
        repo.insert(draft("c")).await.unwrap();

        let removed = repo.remove(1).await.unwrap();
        let next = repo.insert(draft("d")).await.unwrap();

        assert_eq!(removed.map(|c| c.name), Some("a".to_owned()));
        // Two remain (ids 2 and 3); len + 1 = 3 collides, so 4 is used.
        assert_eq!(next.id, 4);
    }

    #[tokio::test]
    async fn test_set_visibility_on_unknown_id_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileCharacterRepository::new(dir.path().join("c.json"), dir.path());

        let result = repo.set_visibility(99, Visibility::Public).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_set_visibility_persists_status() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileCharacterRepository::new(dir.path().join("c.json"), dir.path());
        let created = repo.insert(draft("a")).await.unwrap();

        let updated = repo
            .set_visibility(created.id, Visibility::Public)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, Visibility::Public);
        assert_eq!(repo.load_all().await.unwrap()[0].status, Visibility::Public);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_reads_during_writes_never_see_a_partial_list() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let repo = std::sync::Arc::new(FileCharacterRepository::new(
            dir.path().join("characters.json"),
            dir.path().join("uploads"),
        ));
        for i in 0..100 {
            repo.insert(draft(&format!("seed{i}"))).await.unwrap();
        }
        let writer = {
            let repo = std::sync::Arc::clone(&repo);
            tokio::spawn(async move {
                for i in 0..100 {
                    repo.insert(draft(&format!("new{i}"))).await.unwrap();
                }
            })
        };

        // Act
        let mut short_reads = 0;
        while !writer.is_finished() {
            if repo.load_all().await.unwrap().len() < 100 {
                short_reads += 1;
            }
        }
        writer.await.unwrap();

        // Assert
        assert_eq!(short_reads, 0);
        assert_eq!(repo.load_all().await.unwrap().len(), 200);
        assert!(!dir.path().join("characters.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_infrastructure_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        std::fs::write(&path, "not json").unwrap();
        let repo = FileCharacterRepository::new(&path, dir.path());

        let err = repo.load_all().await.unwrap_err();

        assert!(matches!(err, DomainError::Infrastructure(_)));
    }
}
