//! Routes for playing a character's quiz.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use tracing::{info, instrument};

use saga_quiz::application::query_handlers::{self, AnswerView, QuestionView};

use crate::error::ApiError;
use crate::extract::FormData;
use crate::state::QuizState;

/// POST /api/question/{qid}
#[instrument(skip(state, form))]
async fn get_question(
    State(state): State<QuizState>,
    Path(question_id): Path<u32>,
    form: FormData,
) -> Result<Json<QuestionView>, ApiError> {
    let character_id: u32 = form.parsed("character_id")?;
    let view = query_handlers::get_question(&*state.repository, character_id, question_id).await?;
    Ok(Json(view))
}

/// POST /api/answer
#[instrument(skip(state, form))]
async fn submit_answer(
    State(state): State<QuizState>,
    form: FormData,
) -> Result<Json<AnswerView>, ApiError> {
    let question_id: u32 = form.parsed("question_id")?;
    let character_id: u32 = form.parsed("character_id")?;
    let answer = form.required("answer")?;

    let view =
        query_handlers::submit_answer(&*state.repository, character_id, question_id, answer)
            .await?;

    let outcome = match &view {
        AnswerView::Wrong(_) => "wrong",
        AnswerView::Next(_) => "next",
        AnswerView::Won(_) => "won",
    };
    info!(character_id, question_id, outcome, "answer judged");
    Ok(Json(view))
}

/// Returns the router for the game flow.
pub fn router() -> Router<QuizState> {
    Router::new()
        .route("/api/question/{qid}", post(get_question))
        .route("/api/answer", post(submit_answer))
}
