//! Shared test doubles and utilities for the Saga services.

mod clock;
mod gateway;

pub use clock::FixedClock;
pub use gateway::{FailingGateway, StubQuizGateway, StubStoryGateway};
