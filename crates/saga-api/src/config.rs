//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use saga_upstream::QuizUpstreamConfig;

use crate::error::AppError;

/// Listening address shared by both servers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind, `HOST`.
    pub host: String,
    /// Port to bind, `PORT`.
    pub port: u16,
}

impl ServerConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>, default_port: u16) -> Result<Self, AppError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => default_port,
        };
        Ok(Self { host, port })
    }

    /// Returns the socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` does not parse.
    pub fn addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn path_or(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: &str) -> PathBuf {
    PathBuf::from(lookup(name).unwrap_or_else(|| default.to_owned()))
}

/// Configuration of the quiz server.
#[derive(Debug, Clone)]
pub struct QuizConfig {
    /// Listening address.
    pub server: ServerConfig,
    /// Character list, `SAGA_CHARACTERS_FILE`.
    pub characters_file: PathBuf,
    /// Root of the character folders, `SAGA_UPLOAD_DIR`.
    pub upload_dir: PathBuf,
    /// Admin password file, `SAGA_ADMIN_PASSWORD_FILE`.
    pub admin_password_file: PathBuf,
    /// Suggested prompts, `SAGA_PROMPTS_FILE`.
    pub prompts_file: PathBuf,
    /// Image-edit and question-writing endpoints.
    pub upstream: QuizUpstreamConfig,
}

impl QuizConfig {
    /// Default port of the quiz server.
    pub const DEFAULT_PORT: u16 = 8000;

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an unparseable `PORT`.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an unparseable `PORT`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        Ok(Self {
            server: ServerConfig::from_lookup(&lookup, Self::DEFAULT_PORT)?,
            characters_file: path_or(&lookup, "SAGA_CHARACTERS_FILE", "characters.json"),
            upload_dir: path_or(&lookup, "SAGA_UPLOAD_DIR", "uploads"),
            admin_password_file: path_or(&lookup, "SAGA_ADMIN_PASSWORD_FILE", "password_admin.txt"),
            prompts_file: path_or(&lookup, "SAGA_PROMPTS_FILE", "suggested_prompts.json"),
            upstream: QuizUpstreamConfig {
                image_edit_endpoint: lookup("SAGA_IMAGE_EDIT_ENDPOINT"),
                image_edit_agent: lookup("SAGA_IMAGE_EDIT_AGENT").unwrap_or_default(),
                chat_endpoint: lookup("SAGA_CHAT_ENDPOINT"),
                chat_agent: lookup("SAGA_CHAT_AGENT").unwrap_or_default(),
            },
        })
    }
}

/// Configuration of the story server.
#[derive(Debug, Clone)]
pub struct StoryConfig {
    /// Listening address.
    pub server: ServerConfig,
    /// Upstream settings file, `SAGA_APP_CONFIG`.
    pub app_config: PathBuf,
    /// Story folders, `SAGA_DATA_DIR`.
    pub data_dir: PathBuf,
    /// Static front-end, `SAGA_PUBLIC_DIR`.
    pub public_dir: PathBuf,
}

impl StoryConfig {
    /// Default port of the story server.
    pub const DEFAULT_PORT: u16 = 3030;

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an unparseable `PORT`.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an unparseable `PORT`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        Ok(Self {
            server: ServerConfig::from_lookup(&lookup, Self::DEFAULT_PORT)?,
            app_config: path_or(&lookup, "SAGA_APP_CONFIG", "app_config.json"),
            data_dir: path_or(&lookup, "SAGA_DATA_DIR", "data"),
            public_dir: path_or(&lookup, "SAGA_PUBLIC_DIR", "public"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_quiz_defaults() {
        // Act
        let config = QuizConfig::from_lookup(env(&[])).unwrap();

        // Assert
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.characters_file, PathBuf::from("characters.json"));
        assert_eq!(config.admin_password_file, PathBuf::from("password_admin.txt"));
        assert!(config.upstream.image_edit_endpoint.is_none());
    }

    #[test]
    fn test_story_reads_overrides() {
        let config = StoryConfig::from_lookup(env(&[
            ("PORT", "4000"),
            ("SAGA_DATA_DIR", "/srv/stories"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.data_dir, PathBuf::from("/srv/stories"));
        assert_eq!(config.public_dir, PathBuf::from("public"));
    }

    #[test]
    fn test_invalid_port_is_a_config_error() {
        let result = StoryConfig::from_lookup(env(&[("PORT", "http")]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_addr_combines_host_and_port() {
        let server = ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 3030,
        };

        assert_eq!(server.addr().unwrap().to_string(), "127.0.0.1:3030");
    }
}
