//! Domain types for the story context.

pub mod commands;
pub mod folder;
pub mod record;
