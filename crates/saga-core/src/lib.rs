//! Saga Core — shared abstractions.
//!
//! This crate defines the traits and types that the quiz and story
//! contexts depend on. It contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod gateway;
