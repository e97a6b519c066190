//! Proxy routes to the external text and image generation API.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::{StreamExt, future};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use saga_core::error::DomainError;

use crate::error::ApiError;
use crate::extract::JsonOrForm;
use crate::state::StoryState;

/// Request body for the streaming text endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptTextRequest {
    /// Prompt forwarded to the chat agent.
    #[serde(default)]
    pub prompt_text: Option<String>,
}

/// Request body for POST /api/generate-image.
#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    /// Prompt forwarded to the image agent.
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Query string of GET /api/image-result.
#[derive(Debug, Deserialize)]
pub struct ImageResultQuery {
    /// Id returned when the image was requested.
    #[serde(default)]
    pub request_id: Option<String>,
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError(DomainError::Validation(format!("Missing {name}"))))
}

/// Opens an upstream completion and relays its bytes as they arrive. An
/// upstream error after the first byte ends the response early.
async fn relay_completion(state: &StoryState, prompt_text: &str) -> Result<Response, ApiError> {
    let upstream = state.gateway.stream_completion(prompt_text).await?;

    let chunks = upstream.scan((), |_, chunk| {
        future::ready(match chunk {
            Ok(bytes) => Some(Ok::<_, Infallible>(bytes)),
            Err(e) => {
                warn!(error = %e, "upstream stream failed, closing response");
                None
            }
        })
    });

    Ok((
        [
            (CONTENT_TYPE, "text/event-stream"),
            (CACHE_CONTROL, "no-cache"),
            (CONNECTION, "keep-alive"),
        ],
        Body::from_stream(chunks),
    )
        .into_response())
}

/// POST /api/generate-story
#[instrument(skip(state, request))]
async fn generate_story(
    State(state): State<StoryState>,
    JsonOrForm(request): JsonOrForm<PromptTextRequest>,
) -> Result<Response, ApiError> {
    let prompt_text = required(request.prompt_text, "promptText")?;
    info!(chars = prompt_text.len(), "relaying story generation");
    relay_completion(&state, &prompt_text).await
}

/// POST /api/generate-image-prompt
#[instrument(skip(state, request))]
async fn generate_image_prompt(
    State(state): State<StoryState>,
    JsonOrForm(request): JsonOrForm<PromptTextRequest>,
) -> Result<Response, ApiError> {
    let prompt_text = required(request.prompt_text, "promptText")?;
    info!(chars = prompt_text.len(), "relaying image prompt generation");
    relay_completion(&state, &prompt_text).await
}

/// POST /api/generate-image
#[instrument(skip(state, request))]
async fn generate_image(
    State(state): State<StoryState>,
    JsonOrForm(request): JsonOrForm<ImageRequest>,
) -> Result<Json<Value>, ApiError> {
    let prompt = required(request.prompt, "prompt")?;
    let reply = state.gateway.generate_image(&prompt).await?;
    Ok(Json(reply))
}

/// GET /api/image-result
#[instrument(skip(state, query))]
async fn image_result(
    State(state): State<StoryState>,
    Query(query): Query<ImageResultQuery>,
) -> Result<Json<Value>, ApiError> {
    let request_id = required(query.request_id, "request_id")?;
    let reply = state.gateway.image_result(&request_id).await?;
    Ok(Json(reply))
}

/// Returns the router for the generation proxies.
pub fn router() -> Router<StoryState> {
    Router::new()
        .route("/api/generate-story", post(generate_story))
        .route("/api/generate-image-prompt", post(generate_image_prompt))
        .route("/api/generate-image", post(generate_image))
        .route("/api/image-result", get(image_result))
}
