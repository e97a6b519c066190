//! Generation gateway abstractions.
//!
//! Both services talk to the same external text/image generation API. The
//! traits here describe what each service needs from it; `saga-upstream`
//! provides the HTTP implementation and `saga-test-support` the doubles.

use std::fmt::Write as _;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::Serialize;

use crate::error::DomainError;

/// A stream of raw upstream body chunks, relayed to clients verbatim.
pub type ByteStream = BoxStream<'static, Result<Bytes, DomainError>>;

/// Image reference inside a message content part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageUrl {
    /// An `https://` or `data:` URL.
    pub url: String,
}

/// One part of a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain prompt text.
    Text {
        /// The text.
        text: String,
    },
    /// An image the agent should look at.
    ImageUrl {
        /// The image location.
        image_url: ImageUrl,
    },
}

/// A single chat message sent to an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Message author role, always `user` for these services.
    pub role: String,
    /// Ordered content parts.
    pub content: Vec<ContentPart>,
}

/// Request envelope accepted by the generation API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentRequest {
    /// Conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Name of the upstream agent that should answer.
    pub agent: String,
    /// Set to `true` for server-sent-event responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl AgentRequest {
    /// Builds a single user message holding `parts`, addressed to `agent`.
    #[must_use]
    pub fn user(agent: &str, parts: Vec<ContentPart>) -> Self {
        Self {
            messages: vec![ChatMessage {
                role: "user".to_owned(),
                content: parts,
            }],
            agent: agent.to_owned(),
            stream: None,
        }
    }

    /// Builds a single user text message addressed to `agent`.
    #[must_use]
    pub fn user_text(agent: &str, text: &str) -> Self {
        Self::user(
            agent,
            vec![ContentPart::Text {
                text: text.to_owned(),
            }],
        )
    }

    /// Marks the request as streaming.
    #[must_use]
    pub fn streaming(mut self) -> Self {
        self.stream = Some(true);
        self
    }
}

/// Parameters for AI question generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRequest {
    /// Topic the questions are about.
    pub topic: String,
    /// Difficulty levels to cover, 1 (easy) upwards.
    pub difficulties: Vec<u32>,
    /// Number of questions wanted.
    pub num_questions: u32,
}

impl QuestionRequest {
    /// Renders the instruction sent to the question-writing agent.
    #[must_use]
    pub fn to_prompt(&self) -> String {
        let levels = self
            .difficulties
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let mut prompt = String::new();
        let _ = write!(
            prompt,
            "Write {} multiple-choice quiz questions about \"{}\". ",
            self.num_questions, self.topic
        );
        let _ = write!(
            prompt,
            "Spread them across difficulty levels [{levels}] and order them from easiest to hardest. "
        );
        prompt.push_str(
            "Reply with only a JSON array. Each element must be an object with the keys \
             \"id\" (number), \"question\" (string), \"options\" (array of exactly 4 strings), \
             \"answer\" (one of the options) and \"difficulty\" (number).",
        );
        prompt
    }
}

/// Upstream calls made by the story-generator server.
#[async_trait]
pub trait StoryGateway: Send + Sync {
    /// Starts a streaming completion for `prompt_text` and returns the raw
    /// upstream body as a byte stream.
    async fn stream_completion(&self, prompt_text: &str) -> Result<ByteStream, DomainError>;

    /// Submits an image generation request and returns the upstream JSON.
    async fn generate_image(&self, prompt: &str) -> Result<serde_json::Value, DomainError>;

    /// Polls the result of an image generation request.
    async fn image_result(&self, request_id: &str) -> Result<serde_json::Value, DomainError>;
}

/// Upstream calls made by the quiz server on behalf of character authors.
///
/// Every call uses the API key the author supplied with the request.
#[async_trait]
pub trait QuizGateway: Send + Sync {
    /// Edits `image_data_uri` according to `prompt`. Returns the URL of the
    /// produced image, or `None` when the agent produced nothing.
    async fn edit_image(
        &self,
        api_key: &str,
        image_data_uri: &str,
        prompt: &str,
    ) -> Result<Option<String>, DomainError>;

    /// Downloads a generated asset.
    async fn download(&self, url: &str) -> Result<Bytes, DomainError>;

    /// Asks the question-writing agent for a question set.
    async fn generate_questions(
        &self,
        api_key: &str,
        request: &QuestionRequest,
    ) -> Result<Vec<serde_json::Value>, DomainError>;
}
