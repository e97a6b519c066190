//! Route modules organized by bounded context.

use axum::http::HeaderMap;

pub mod admin;
pub mod authoring;
pub mod characters;
pub mod game;
pub mod generation;
pub mod health;
pub mod stories;

/// Header identifying the player, set by the quiz front-end.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the admin password.
pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

/// Returns a header value as text, treating blank values as absent.
pub(crate) fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
}
