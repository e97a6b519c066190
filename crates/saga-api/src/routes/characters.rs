//! Routes for the player-facing character list.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use tracing::{info, instrument};

use saga_quiz::application::query_handlers::{self, CharacterListing};

use super::{USER_ID_HEADER, header_text};
use crate::error::ApiError;
use crate::state::QuizState;

/// Query string of the character listings.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Index of the first character to return.
    #[serde(default)]
    pub offset: usize,
    /// `desktop` or `mobile`; decides the page size.
    #[serde(default = "default_platform")]
    pub platform: String,
    /// Sort order, admin listing only.
    #[serde(default = "default_sort")]
    pub sort: String,
}

fn default_platform() -> String {
    "desktop".to_owned()
}

fn default_sort() -> String {
    "oldest".to_owned()
}

/// GET /api/characters
#[instrument(skip(state, headers), fields(offset = query.offset, platform = %query.platform))]
async fn list_characters(
    State(state): State<QuizState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<CharacterListing>, ApiError> {
    let user_id = header_text(&headers, USER_ID_HEADER);
    let listing = query_handlers::list_visible_characters(
        &*state.repository,
        user_id,
        query.offset,
        &query.platform,
    )
    .await?;

    info!(returned = listing.characters.len(), total = listing.total, "characters listed");
    Ok(Json(listing))
}

/// Returns the router for the player-facing character list.
pub fn router() -> Router<QuizState> {
    Router::new().route("/api/characters", get(list_characters))
}
