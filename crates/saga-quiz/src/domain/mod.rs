//! Domain types for the quiz context.

pub mod browse;
pub mod character;
pub mod commands;
pub mod listing;
pub mod question;
pub mod run;
