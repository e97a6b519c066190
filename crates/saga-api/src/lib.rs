//! Saga API — Axum HTTP layer for the reveal quiz and story generator.
//!
//! The two servers share error mapping, configuration, telemetry, and the
//! form extractor; each binary in `src/bin` wires its own state and router.

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;
pub mod telemetry;
