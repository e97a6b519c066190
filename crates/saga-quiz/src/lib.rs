//! Saga — reveal quiz bounded context.
//!
//! Responsible for quiz characters and their question sets, the public and
//! admin character listings, the answer/reveal game flow, character uploads
//! with background image generation, and the client-side page and heart
//! bookkeeping the game front-ends share.

pub mod admin;
pub mod application;
pub mod assets;
pub mod domain;
pub mod repository;
