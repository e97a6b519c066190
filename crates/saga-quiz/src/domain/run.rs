//! A player's run through one character's questions.
//!
//! The server only judges single answers; lives and the per-question list of
//! wrong picks are tracked by the client in a `GameRun`.

use super::question::Question;

/// Hearts a player starts with.
pub const STARTING_HEARTS: u8 = 3;

/// Where a run stands.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    /// Waiting for an answer to the current question.
    Playing,
    /// All hearts are gone.
    GameOver,
    /// Every question was answered; holds the fully revealed image.
    Won {
        /// Final image as a data URI, when the server sent one.
        final_image: Option<String>,
    },
}

/// Client-side state of one game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRun {
    character_id: u32,
    question_id: u32,
    hearts: u8,
    wrong_answers: Vec<String>,
    status: RunStatus,
}

impl GameRun {
    /// Starts a run at question 1 with full hearts.
    #[must_use]
    pub fn start(character_id: u32) -> Self {
        Self {
            character_id,
            question_id: 1,
            hearts: STARTING_HEARTS,
            wrong_answers: Vec::new(),
            status: RunStatus::Playing,
        }
    }

    /// The character being played.
    #[must_use]
    pub fn character_id(&self) -> u32 {
        self.character_id
    }

    /// Id of the question to answer next.
    #[must_use]
    pub fn question_id(&self) -> u32 {
        self.question_id
    }

    /// Remaining hearts.
    #[must_use]
    pub fn hearts(&self) -> u8 {
        self.hearts
    }

    /// Wrong options picked for the current question, in pick order.
    #[must_use]
    pub fn wrong_answers(&self) -> &[String] {
        &self.wrong_answers
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    /// Records a rejected answer. Costs one heart; the option is remembered
    /// once so the client can grey it out.
    pub fn record_wrong(&mut self, answer: &str) -> &RunStatus {
        if self.status != RunStatus::Playing {
            return &self.status;
        }
        if !self.wrong_answers.iter().any(|a| a == answer) {
            self.wrong_answers.push(answer.to_owned());
        }
        self.hearts = self.hearts.saturating_sub(1);
        if self.hearts == 0 {
            self.status = RunStatus::GameOver;
        }
        &self.status
    }

    /// Records an accepted answer that leads to `next`.
    pub fn advance_to(&mut self, next: &Question) {
        if self.status == RunStatus::Playing {
            self.question_id = next.id;
            self.wrong_answers.clear();
        }
    }

    /// Records the winning answer.
    pub fn win(&mut self, final_image: Option<String>) {
        if self.status == RunStatus::Playing {
            self.wrong_answers.clear();
            self.status = RunStatus::Won { final_image };
        }
    }
}
