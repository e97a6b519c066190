//! Admin password check.

use std::path::PathBuf;

use saga_core::error::DomainError;
use tracing::warn;

/// Admin password stored in a plain text file.
///
/// The file is re-read on every check so the password can be rotated
/// without a restart.
#[derive(Debug, Clone)]
pub struct PasswordFile {
    path: PathBuf,
}

impl PasswordFile {
    /// Creates a checker over `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Compares `candidate` with the stored password, both trimmed. A missing
    /// or unreadable file rejects every password.
    pub async fn verify(&self, candidate: &str) -> bool {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(stored) => candidate.trim() == stored.trim(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "admin password file unavailable");
                false
            }
        }
    }

    /// Checks a password presented on an admin route.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Unauthorized` when the password is absent or
    /// wrong.
    pub async fn authorize(&self, candidate: Option<&str>) -> Result<(), DomainError> {
        match candidate {
            Some(password) if self.verify(password).await => Ok(()),
            _ => Err(DomainError::Unauthorized(
                "Invalid admin password".to_owned(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_verify_trims_both_sides() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("password_admin.txt");
        std::fs::write(&path, "hunter2\n").unwrap();
        let password = PasswordFile::new(&path);

        // Act / Assert
        assert!(password.verify("  hunter2 ").await);
        assert!(!password.verify("hunter3").await);
    }

    #[tokio::test]
    async fn test_missing_file_rejects_everything() {
        let dir = tempfile::tempdir().unwrap();
        let password = PasswordFile::new(dir.path().join("absent.txt"));

        assert!(!password.verify("").await);
    }

    #[tokio::test]
    async fn test_authorize_without_header_is_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.txt");
        std::fs::write(&path, "s3cret").unwrap();
        let password = PasswordFile::new(&path);

        let missing = password.authorize(None).await;
        let correct = password.authorize(Some("s3cret")).await;

        assert!(matches!(missing, Err(DomainError::Unauthorized(_))));
        assert!(correct.is_ok());
    }
}
