//! Upstream endpoint configuration.

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};

/// Settings of the story server's upstream API, read from `app_config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpstreamConfig {
    /// Value of the `x-api-key` header.
    pub api_key: String,
    /// Chat completion endpoint.
    pub api_endpoint: String,
    /// Agent that writes stories and image prompts.
    pub chat_agent: String,
    /// Image generation endpoint.
    pub image_endpoint: String,
    /// Agent that draws images.
    pub image_agent: String,
    /// Endpoint polled for finished images.
    pub result_endpoint: String,
}

impl UpstreamConfig {
    /// Reads the configuration at `path`. A missing or malformed file is
    /// logged and yields the empty default, so the server still starts.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let parsed = std::fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| serde_json::from_slice::<Self>(&bytes).map_err(|e| e.to_string()));
        match parsed {
            Ok(config) => {
                info!(path = %path.display(), "upstream config loaded");
                config
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to load upstream config");
                Self::default()
            }
        }
    }
}

/// Settings of the quiz server's upstream calls. The API key is supplied
/// per request by the character author.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizUpstreamConfig {
    /// Image-edit endpoint.
    pub image_edit_endpoint: Option<String>,
    /// Agent that edits images.
    pub image_edit_agent: String,
    /// Chat endpoint used for question writing.
    pub chat_endpoint: Option<String>,
    /// Agent that writes questions.
    pub chat_agent: String,
}
