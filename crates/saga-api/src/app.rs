//! Router assembly for both servers.

use std::path::Path;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::routes;
use crate::state::{QuizState, StoryState};

/// Largest accepted quiz request body; uploads carry an image.
pub const QUIZ_BODY_LIMIT: usize = 25 * 1024 * 1024;

/// Largest accepted story request body.
pub const STORY_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Builds the quiz server's routes, without the outer layers.
pub fn quiz_routes() -> Router<QuizState> {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::characters::router())
        .merge(routes::admin::router())
        .merge(routes::game::router())
        .merge(routes::authoring::router())
}

/// Builds the complete quiz server.
pub fn quiz_app(state: QuizState) -> Router {
    // TODO: Replace CorsLayer::permissive() with the front-end origin once it is deployed.
    quiz_routes()
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(QUIZ_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Builds the story server's routes, including the static front-end under
/// `public_dir` and the story folders under `data_dir`.
pub fn story_routes(data_dir: &Path, public_dir: &Path) -> Router<StoryState> {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::stories::router())
        .merge(routes::generation::router())
        .route_service("/creator", ServeFile::new(public_dir.join("creator.html")))
        .route_service("/story", ServeFile::new(public_dir.join("story.html")))
        .nest_service("/data", ServeDir::new(data_dir))
        .fallback_service(ServeDir::new(public_dir))
}

/// Builds the complete story server.
pub fn story_app(state: StoryState, data_dir: &Path, public_dir: &Path) -> Router {
    story_routes(data_dir, public_dir)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(STORY_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
