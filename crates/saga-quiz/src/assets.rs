//! Files inside a character folder: reveal images and `questions.json`.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use saga_core::error::DomainError;

use crate::domain::question::Question;

/// File holding a character's question set.
pub const QUESTIONS_FILE: &str = "questions.json";

/// Extensions recognized as reveal images.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// MIME type for an image path, by extension. Unknown extensions are served
/// as PNG.
#[must_use]
pub fn mime_for(path: &Path) -> &'static str {
    match extension_of(path).as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

/// Encodes `bytes` as a `data:` URI.
#[must_use]
pub fn data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Reads an image file into a `data:` URI.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the file cannot be read.
pub async fn read_data_uri(path: &Path) -> Result<String, DomainError> {
    let bytes = tokio::fs::read(path).await?;
    Ok(data_uri(&bytes, mime_for(path)))
}

fn is_image(path: &Path) -> bool {
    extension_of(path).is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

/// Sort key placing numerically named files (`0.png`, `1.png`, ..., `10.png`)
/// first in numeric order, then everything else by name.
fn reveal_order(path: &Path) -> (u8, u64, String) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let number = path
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.parse::<u64>().ok());
    match number {
        Some(n) => (0, n, name),
        None => (1, 0, name),
    }
}

/// Lists the reveal images of a folder in reveal order.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the folder cannot be read.
pub async fn list_images(folder: &Path) -> Result<Vec<PathBuf>, DomainError> {
    let mut entries = tokio::fs::read_dir(folder).await?;
    let mut images = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file() && is_image(&path) {
            images.push(path);
        }
    }
    images.sort_by_cached_key(|p| reveal_order(p));
    Ok(images)
}

/// Loads a character's question set.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the folder has no `questions.json`,
/// `DomainError::Infrastructure` if it cannot be read or parsed.
pub async fn load_questions(folder: &Path) -> Result<Vec<Question>, DomainError> {
    let path = folder.join(QUESTIONS_FILE);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DomainError::NotFound(format!(
                "questions file not found: {}",
                path.display()
            )));
        }
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_slice(&bytes)?)
}

/// Writes a character's question set, pretty-printed.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the file cannot be written.
pub async fn write_questions(folder: &Path, questions: &[Question]) -> Result<(), DomainError> {
    let body = serde_json::to_vec_pretty(questions)?;
    tokio::fs::write(folder.join(QUESTIONS_FILE), body).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for_known_and_unknown_extensions() {
        assert_eq!(mime_for(Path::new("a/0.JPG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("a/1.webp")), "image/webp");
        assert_eq!(mime_for(Path::new("a/2.bmp")), "image/png");
    }

    #[test]
    fn test_data_uri_encodes_base64() {
        assert_eq!(data_uri(b"hi", "image/png"), "data:image/png;base64,aGk=");
    }

    #[tokio::test]
    async fn test_list_images_orders_numerically_and_skips_other_files() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        for name in ["10.png", "2.png", "0.png", "1.jpg", "questions.json", "cover.webp"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("3.png")).unwrap();

        // Act
        let images = list_images(dir.path()).await.unwrap();

        // Assert
        let names: Vec<String> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["0.png", "1.jpg", "2.png", "10.png", "cover.webp"]);
    }

    #[tokio::test]
    async fn test_load_questions_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();

        let err = load_questions(dir.path()).await.unwrap_err();

        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
