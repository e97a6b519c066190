//! `QuizGateway` over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use saga_core::error::DomainError;
use saga_core::gateway::{AgentRequest, ContentPart, ImageUrl, QuestionRequest, QuizGateway};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::QuizUpstreamConfig;
use crate::reply;
use crate::story::{API_KEY_HEADER, client, ensure_success, transport_error};

/// Downloads of generated images give up after this long.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Quiz server gateway. Each call authenticates with the key the character
/// author supplied.
#[derive(Debug, Clone)]
pub struct HttpQuizGateway {
    client: Client,
    config: QuizUpstreamConfig,
}

impl HttpQuizGateway {
    /// Creates a gateway for `config`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the TLS backend cannot be
    /// initialised.
    pub fn new(config: QuizUpstreamConfig) -> Result<Self, DomainError> {
        Ok(Self {
            client: client()?,
            config,
        })
    }

    async fn call(
        &self,
        endpoint: Option<&str>,
        what: &str,
        api_key: &str,
        body: &AgentRequest,
    ) -> Result<Value, DomainError> {
        let endpoint = endpoint
            .filter(|e| !e.is_empty())
            .ok_or_else(|| DomainError::Infrastructure(format!("{what} endpoint not configured")))?;
        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(API_KEY_HEADER, api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        ensure_success(response)?
            .json()
            .await
            .map_err(|e| transport_error(&e))
    }
}

#[async_trait]
impl QuizGateway for HttpQuizGateway {
    #[instrument(skip(self, api_key, image_data_uri, prompt))]
    async fn edit_image(
        &self,
        api_key: &str,
        image_data_uri: &str,
        prompt: &str,
    ) -> Result<Option<String>, DomainError> {
        let body = AgentRequest::user(
            &self.config.image_edit_agent,
            vec![
                ContentPart::Text {
                    text: prompt.to_owned(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image_data_uri.to_owned(),
                    },
                },
            ],
        );
        let reply = self
            .call(
                self.config.image_edit_endpoint.as_deref(),
                "image edit",
                api_key,
                &body,
            )
            .await?;
        let url = reply::image_url(&reply);
        if url.is_none() {
            warn!("image edit reply carried no image url");
        }
        Ok(url)
    }

    #[instrument(skip(self))]
    async fn download(&self, url: &str) -> Result<Bytes, DomainError> {
        let response = self
            .client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        let bytes = ensure_success(response)?
            .bytes()
            .await
            .map_err(|e| transport_error(&e))?;
        debug!(bytes = bytes.len(), "image downloaded");
        Ok(bytes)
    }

    #[instrument(skip(self, api_key, request), fields(topic = %request.topic))]
    async fn generate_questions(
        &self,
        api_key: &str,
        request: &QuestionRequest,
    ) -> Result<Vec<Value>, DomainError> {
        let body = AgentRequest::user_text(&self.config.chat_agent, &request.to_prompt());
        let reply = self
            .call(self.config.chat_endpoint.as_deref(), "chat", api_key, &body)
            .await?;
        let text = reply::reply_text(&reply).ok_or_else(|| {
            DomainError::Infrastructure("agent reply carried no text".into())
        })?;
        reply::question_array(&text)
    }
}
