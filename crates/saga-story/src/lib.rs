//! Saga — story bounded context.
//!
//! Responsible for persisting generated stories: the prompt/config record of
//! each story folder, its Markdown export, publish metadata, and the
//! published-story catalogue.

pub mod application;
pub mod archive;
pub mod domain;
