//! Saga Upstream — `reqwest` implementations of the generation gateways.
//!
//! The story server and the quiz server both reach the same external
//! generation API; this crate owns the HTTP details (headers, envelopes,
//! status handling, and digging results out of loosely shaped replies).

pub mod config;
pub mod quiz;
pub mod reply;
pub mod story;

pub use config::{QuizUpstreamConfig, UpstreamConfig};
pub use quiz::HttpQuizGateway;
pub use story::HttpStoryGateway;
