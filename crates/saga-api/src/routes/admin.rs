//! Routes for the admin panel. Every route requires `x-admin-password`.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use saga_quiz::application::{command_handlers, query_handlers};
use saga_quiz::domain::character::{Character, Visibility};
use saga_quiz::domain::commands;

use super::characters::ListQuery;
use super::{ADMIN_PASSWORD_HEADER, header_text};
use crate::error::ApiError;
use crate::state::QuizState;

/// Response body of a delete.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Outcome for display.
    pub message: String,
}

/// Response body of a visibility change.
#[derive(Debug, Serialize)]
pub struct VisibilityResponse {
    /// Outcome for display.
    pub message: String,
    /// The updated record.
    pub character: Character,
}

async fn authorize(state: &QuizState, headers: &HeaderMap) -> Result<(), ApiError> {
    state
        .password
        .authorize(header_text(headers, ADMIN_PASSWORD_HEADER))
        .await?;
    Ok(())
}

/// GET /api/admin/characters
#[instrument(skip(state, headers), fields(offset = query.offset, sort = %query.sort))]
async fn list_all(
    State(state): State<QuizState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<query_handlers::CharacterListing>, ApiError> {
    authorize(&state, &headers).await?;
    let listing = query_handlers::list_all_characters(
        &*state.repository,
        query.offset,
        &query.platform,
        &query.sort,
    )
    .await?;
    Ok(Json(listing))
}

/// DELETE /api/admin/characters/{id}
#[instrument(skip(state, headers))]
async fn delete_character(
    State(state): State<QuizState>,
    headers: HeaderMap,
    Path(character_id): Path<u32>,
) -> Result<Json<MessageResponse>, ApiError> {
    authorize(&state, &headers).await?;
    let command = commands::DeleteCharacter {
        correlation_id: Uuid::new_v4(),
        character_id,
    };

    info!(correlation_id = %command.correlation_id, "handling delete_character command");

    command_handlers::handle_delete_character(&command, &*state.repository).await?;

    Ok(Json(MessageResponse {
        message: format!("Character {character_id} deleted successfully"),
    }))
}

async fn set_visibility(
    state: &QuizState,
    headers: &HeaderMap,
    character_id: u32,
    visibility: Visibility,
) -> Result<Json<VisibilityResponse>, ApiError> {
    authorize(state, headers).await?;
    let command = commands::SetVisibility {
        correlation_id: Uuid::new_v4(),
        character_id,
        visibility,
    };

    info!(correlation_id = %command.correlation_id, "handling set_visibility command");

    let character = command_handlers::handle_set_visibility(&command, &*state.repository).await?;

    Ok(Json(VisibilityResponse {
        message: format!("Character {character_id} is now {}", visibility.as_str()),
        character,
    }))
}

/// PUT /api/admin/characters/{id}/make-public
#[instrument(skip(state, headers))]
async fn make_public(
    State(state): State<QuizState>,
    headers: HeaderMap,
    Path(character_id): Path<u32>,
) -> Result<Json<VisibilityResponse>, ApiError> {
    set_visibility(&state, &headers, character_id, Visibility::Public).await
}

/// PUT /api/admin/characters/{id}/make-private
#[instrument(skip(state, headers))]
async fn make_private(
    State(state): State<QuizState>,
    headers: HeaderMap,
    Path(character_id): Path<u32>,
) -> Result<Json<VisibilityResponse>, ApiError> {
    set_visibility(&state, &headers, character_id, Visibility::Private).await
}

/// Returns the router for the admin panel.
pub fn router() -> Router<QuizState> {
    Router::new()
        .route("/api/admin/characters", get(list_all))
        .route("/api/admin/characters/{id}", delete(delete_character))
        .route("/api/admin/characters/{id}/make-public", put(make_public))
        .route("/api/admin/characters/{id}/make-private", put(make_private))
}
