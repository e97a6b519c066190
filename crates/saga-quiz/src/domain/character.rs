//! Quiz characters.

use std::path::{Component, Path};

use saga_core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Owner recorded for characters uploaded without an `x-user-id` header.
pub const ANONYMOUS_OWNER: &str = "No one";

/// Who may see a character in the public listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Listed for every player.
    #[default]
    Public,
    /// Listed only for its owner.
    Private,
}

impl Visibility {
    /// Lowercase label used in messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

fn default_owner() -> String {
    "public".to_owned()
}

/// A quiz persona: a folder holding its reveal images and question set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Numeric identifier, unique within the character file.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Path of the uploaded base image (`<folder>/0.<ext>`).
    pub original_image: String,
    /// Folder holding the images and `questions.json`.
    pub folder: String,
    /// User id of the uploader.
    #[serde(default = "default_owner")]
    pub owner: String,
    /// Listing visibility.
    #[serde(default)]
    pub status: Visibility,
}

impl Character {
    /// Returns whether `user_id` may see this character in the public listing.
    #[must_use]
    pub fn is_visible_to(&self, user_id: Option<&str>) -> bool {
        self.status == Visibility::Public || user_id.is_some_and(|user| user == self.owner)
    }
}

/// A character that has not been assigned an id yet.
#[derive(Debug, Clone)]
pub struct CharacterDraft {
    /// Display name.
    pub name: String,
    /// Extension of the base image, including the leading dot.
    pub image_ext: String,
    /// Uploader, if known.
    pub owner: Option<String>,
}

impl CharacterDraft {
    /// Materializes the draft under `uploads_dir` with the given id.
    ///
    /// New characters start private.
    #[must_use]
    pub fn into_character(self, id: u32, uploads_dir: &Path) -> Character {
        let folder = uploads_dir.join(folder_name(id, &self.name));
        let original_image = folder.join(format!("0{}", self.image_ext));
        Character {
            id,
            name: self.name,
            original_image: original_image.to_string_lossy().into_owned(),
            folder: folder.to_string_lossy().into_owned(),
            owner: self
                .owner
                .unwrap_or_else(|| ANONYMOUS_OWNER.to_owned()),
            status: Visibility::Private,
        }
    }
}

/// Folder name for a character: `<id>_<name>` with spaces replaced by
/// underscores and the name lowercased.
#[must_use]
pub fn folder_name(id: u32, name: &str) -> String {
    format!("{id}_{}", name.replace(' ', "_").to_lowercase())
}

/// Checks that `name` turns into a folder sitting directly under the
/// uploads directory.
///
/// # Errors
///
/// Returns `DomainError::Validation` when the name holds a path separator or
/// a control character, or would not form a single normal path component.
pub fn validate_name(name: &str) -> Result<(), DomainError> {
    let folder = folder_name(0, name);
    let mut components = Path::new(&folder).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_normal || name.contains(['/', '\\']) || name.chars().any(char::is_control) {
        return Err(DomainError::Validation(format!(
            "invalid character name: {name:?}"
        )));
    }
    Ok(())
}

/// Next free id: one past the number of characters, bumped until it does not
/// collide with an existing id.
#[must_use]
pub fn next_id(existing: &[Character]) -> u32 {
    let mut candidate = u32::try_from(existing.len()).unwrap_or(u32::MAX - 1) + 1;
    while existing.iter().any(|c| c.id == candidate) {
        candidate += 1;
    }
    candidate
}

/// Extension of an uploaded file name, including the dot. Defaults to `.png`.
#[must_use]
pub fn image_extension(file_name: Option<&str>) -> String {
    file_name
        .map(Path::new)
        .and_then(Path::extension)
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map_or_else(|| ".png".to_owned(), |ext| format!(".{ext}"))
}
