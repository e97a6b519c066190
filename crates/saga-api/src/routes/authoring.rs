//! Routes for creating characters: upload, question generation, prompt
//! suggestions, and the admin password check used by the upload page.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use tracing::{Instrument, error, info, info_span, instrument};
use uuid::Uuid;

use saga_core::error::DomainError;
use saga_quiz::application::{command_handlers, query_handlers};
use saga_quiz::domain::character::Character;
use saga_quiz::domain::commands;

use super::{USER_ID_HEADER, header_text};
use crate::error::ApiError;
use crate::extract::FormData;
use crate::state::QuizState;

/// Response body of an upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Outcome for display.
    pub message: String,
    /// The registered character.
    pub character: Character,
}

/// Response body of a password check.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    /// Whether the password matched.
    pub valid: bool,
    /// Outcome for display.
    pub message: String,
}

/// Response body of the prompt suggestions.
#[derive(Debug, Serialize)]
pub struct PromptsResponse {
    /// Suggestions as stored.
    pub prompts: Vec<Value>,
}

/// Response body of question generation. Failures are reported in-band.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum GenerateResponse {
    /// Questions were produced.
    Generated {
        /// Always `true`.
        success: bool,
        /// The generated questions.
        questions: Vec<Value>,
        /// Number of questions.
        count: usize,
    },
    /// Nothing usable came back.
    Failed {
        /// Always `false`.
        success: bool,
        /// Reason for display.
        message: String,
    },
}

/// POST /api/upload
#[instrument(skip(state, headers, form))]
async fn upload(
    State(state): State<QuizState>,
    headers: HeaderMap,
    form: FormData,
) -> Result<Json<UploadResponse>, ApiError> {
    let image = form.file("image");
    let command = commands::UploadCharacter {
        correlation_id: Uuid::new_v4(),
        name: form.required("name")?.to_owned(),
        owner: header_text(&headers, USER_ID_HEADER).map(str::to_owned),
        api_key: form.required("api_key")?.to_owned(),
        prompts: form
            .all("prompts")
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .map(str::to_owned)
            .collect(),
        image_file_name: image.and_then(|f| f.file_name.clone()),
        image: image.map(|f| f.data.to_vec()).unwrap_or_default(),
        questions_json: form
            .text("questions_json")
            .filter(|q| !q.trim().is_empty())
            .map(str::to_owned),
    };

    info!(correlation_id = %command.correlation_id, "handling upload_character command");

    let outcome = command_handlers::handle_upload_character(&command, &*state.repository).await?;

    if let Some(job) = outcome.reveal_job {
        let gateway = Arc::clone(&state.gateway);
        let span = info_span!("reveal_job", correlation_id = %command.correlation_id, character_id = job.character_id);
        tokio::spawn(
            async move {
                let stored = command_handlers::run_reveal_job(job, gateway.as_ref()).await;
                info!(stored, "reveal images generated");
            }
            .instrument(span),
        );
    }

    Ok(Json(UploadResponse {
        message: format!(
            "Character '{}' has been added successfully! Images are being generated in the background.",
            outcome.character.name
        ),
        character: outcome.character,
    }))
}

/// POST /api/generate-questions
#[instrument(skip(state, form))]
async fn generate_questions(
    State(state): State<QuizState>,
    form: FormData,
) -> Result<Json<GenerateResponse>, ApiError> {
    let difficulties = form
        .all("difficulties")
        .into_iter()
        .map(|d| d.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| DomainError::Validation("invalid form field: difficulties".into()))?;
    let command = commands::GenerateQuestions {
        correlation_id: Uuid::new_v4(),
        api_key: form.required("api_key")?.to_owned(),
        topic: form.required("topic")?.to_owned(),
        difficulties,
        num_questions: form.parsed("num_questions")?,
    };

    info!(correlation_id = %command.correlation_id, "handling generate_questions command");

    let response = match command_handlers::handle_generate_questions(&command, &*state.gateway)
        .await
    {
        Ok(questions) if !questions.is_empty() => GenerateResponse::Generated {
            success: true,
            count: questions.len(),
            questions,
        },
        Ok(_) => GenerateResponse::Failed {
            success: false,
            message: "Failed to generate questions. Please try again.".to_owned(),
        },
        Err(e) => {
            error!(correlation_id = %command.correlation_id, error = %e, "question generation failed");
            GenerateResponse::Failed {
                success: false,
                message: format!("Error: {e}"),
            }
        }
    };
    Ok(Json(response))
}

/// POST /api/verify-password
#[instrument(skip(state, form))]
async fn verify_password(
    State(state): State<QuizState>,
    form: FormData,
) -> Result<Json<VerifyResponse>, ApiError> {
    let valid = state.password.verify(form.required("password")?).await;
    let message = if valid {
        "Authentication successful!"
    } else {
        "Incorrect password!"
    };
    Ok(Json(VerifyResponse {
        valid,
        message: message.to_owned(),
    }))
}

/// GET /api/prompts
async fn prompts(State(state): State<QuizState>) -> Json<PromptsResponse> {
    Json(PromptsResponse {
        prompts: query_handlers::load_suggested_prompts(&state.prompts_file).await,
    })
}

/// Returns the router for character authoring.
pub fn router() -> Router<QuizState> {
    Router::new()
        .route("/api/upload", post(upload))
        .route("/api/generate-questions", post(generate_questions))
        .route("/api/verify-password", post(verify_password))
        .route("/api/prompts", get(prompts))
}
