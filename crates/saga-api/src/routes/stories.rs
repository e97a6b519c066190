//! Routes for saving, exporting, publishing, and reading stories.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument};
use uuid::Uuid;

use saga_core::error::DomainError;
use saga_story::application::{command_handlers, query_handlers};
use saga_story::archive::{DATA_FILE, MARKDOWN_FILE};
use saga_story::domain::commands;
use saga_story::domain::record::{StoryDetail, StorySummary};

use crate::error::ApiError;
use crate::extract::JsonOrForm;
use crate::state::StoryState;

/// Request body for POST /save.
#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    /// Generation config.
    #[serde(default)]
    pub config: Option<Value>,
    /// Prompt; must carry `prompt_text`.
    #[serde(default)]
    pub prompt: Option<Value>,
}

/// Response body of POST /save.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    /// Outcome for display.
    pub message: String,
    /// Folder created for the story.
    pub story_folder: String,
    /// Name of the record file inside the folder.
    pub data_file: String,
}

/// Request body for POST /export.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    /// Target story folder.
    #[serde(default)]
    pub story_folder: Option<String>,
    /// Markdown text.
    #[serde(default)]
    pub markdown: Option<String>,
}

/// Response body of POST /export.
#[derive(Debug, Serialize)]
pub struct ExportResponse {
    /// Outcome for display.
    pub message: String,
    /// Name of the Markdown file inside the folder.
    pub file: String,
}

/// Request body for POST /api/publish.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    /// Story folder to publish.
    #[serde(default)]
    pub story_folder: Option<String>,
    /// Catalogue title.
    #[serde(default)]
    pub title: Option<String>,
    /// Catalogue author.
    #[serde(default)]
    pub author: Option<String>,
    /// Catalogue blurb.
    #[serde(default)]
    pub description: Option<String>,
    /// Cover image URL.
    #[serde(default)]
    pub cover_image: Option<String>,
}

/// Response body of POST /api/publish.
#[derive(Debug, Serialize)]
pub struct PublishResponse {
    /// Outcome for display.
    pub message: String,
    /// The published folder.
    pub folder: String,
}

/// POST /save
#[instrument(skip(state, request))]
async fn save(
    State(state): State<StoryState>,
    Json(request): Json<SaveRequest>,
) -> Result<Json<SaveResponse>, ApiError> {
    let command = commands::SaveStory {
        correlation_id: Uuid::new_v4(),
        prompt: request.prompt,
        config: request.config,
    };

    info!(correlation_id = %command.correlation_id, "handling save_story command");

    let folder =
        command_handlers::handle_save_story(&command, state.clock.as_ref(), &*state.archive)
            .await?;

    Ok(Json(SaveResponse {
        message: "Saved successfully".to_owned(),
        data_file: DATA_FILE.to_owned(),
        story_folder: folder.to_string(),
    }))
}

/// POST /export
#[instrument(skip(state, request))]
async fn export(
    State(state): State<StoryState>,
    JsonOrForm(request): JsonOrForm<ExportRequest>,
) -> Result<Json<ExportResponse>, ApiError> {
    let command = commands::ExportStory {
        correlation_id: Uuid::new_v4(),
        story_folder: request.story_folder,
        markdown: request.markdown,
    };

    info!(correlation_id = %command.correlation_id, "handling export_story command");

    command_handlers::handle_export_story(&command, &*state.archive).await?;

    Ok(Json(ExportResponse {
        message: "Markdown saved successfully".to_owned(),
        file: MARKDOWN_FILE.to_owned(),
    }))
}

/// POST /api/publish
#[instrument(skip(state, request))]
async fn publish(
    State(state): State<StoryState>,
    JsonOrForm(request): JsonOrForm<PublishRequest>,
) -> Result<Json<PublishResponse>, ApiError> {
    let command = commands::PublishStory {
        correlation_id: Uuid::new_v4(),
        story_folder: request.story_folder,
        title: request.title,
        author: request.author,
        description: request.description,
        cover_image: request.cover_image,
    };

    info!(correlation_id = %command.correlation_id, "handling publish_story command");

    let folder =
        command_handlers::handle_publish_story(&command, state.clock.as_ref(), &*state.archive)
            .await?;

    Ok(Json(PublishResponse {
        message: "Story published successfully".to_owned(),
        folder: folder.to_string(),
    }))
}

/// GET /api/stories
#[instrument(skip(state))]
async fn list_stories(
    State(state): State<StoryState>,
) -> Result<Json<Vec<StorySummary>>, ApiError> {
    let stories = query_handlers::list_published_stories(&*state.archive).await?;
    Ok(Json(stories))
}

/// GET /api/story/{folder}
#[instrument(skip(state))]
async fn get_story(
    State(state): State<StoryState>,
    Path(folder): Path<String>,
) -> Result<Json<StoryDetail>, ApiError> {
    let detail = query_handlers::get_story(&*state.archive, &folder).await?;
    Ok(Json(detail))
}

/// GET /api/story/{folder}/content
///
/// Answers in plain text, errors included, since readers render the body
/// directly.
#[instrument(skip(state))]
async fn get_story_content(
    State(state): State<StoryState>,
    Path(folder): Path<String>,
) -> Response {
    let plain = [(CONTENT_TYPE, "text/plain; charset=utf-8")];
    match query_handlers::get_story_content(&*state.archive, &folder).await {
        Ok(markdown) => (StatusCode::OK, plain, markdown).into_response(),
        Err(DomainError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, plain, "Story content not found").into_response()
        }
        Err(DomainError::Validation(_)) => {
            (StatusCode::BAD_REQUEST, plain, "Invalid story folder").into_response()
        }
        Err(e) => {
            error!(error = %e, "failed to read story content");
            (StatusCode::INTERNAL_SERVER_ERROR, plain, "Server error").into_response()
        }
    }
}

/// Returns the router for story persistence.
pub fn router() -> Router<StoryState> {
    Router::new()
        .route("/save", post(save))
        .route("/export", post(export))
        .route("/api/publish", post(publish))
        .route("/api/stories", get(list_stories))
        .route("/api/story/{folder}", get(get_story))
        .route("/api/story/{folder}/content", get(get_story_content))
}
