//! `StoryGateway` over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Response};
use saga_core::error::DomainError;
use saga_core::gateway::{AgentRequest, ByteStream, StoryGateway};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::UpstreamConfig;

pub(crate) const API_KEY_HEADER: &str = "x-api-key";

/// Builds the shared client. Only the connect phase is bounded; streamed
/// bodies may run as long as the agent keeps writing.
pub(crate) fn client() -> Result<Client, DomainError> {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| DomainError::Infrastructure(format!("cannot build HTTP client: {e}")))
}

pub(crate) fn transport_error(err: &reqwest::Error) -> DomainError {
    DomainError::Infrastructure(format!("upstream request failed: {err}"))
}

/// Turns a non-success response into `DomainError::Upstream`.
pub(crate) fn ensure_success(response: Response) -> Result<Response, DomainError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        warn!(status = status.as_u16(), url = %response.url(), "upstream returned an error");
        Err(DomainError::Upstream {
            status: status.as_u16(),
        })
    }
}

/// Story server gateway configured from `app_config.json`.
#[derive(Debug, Clone)]
pub struct HttpStoryGateway {
    client: Client,
    config: UpstreamConfig,
}

impl HttpStoryGateway {
    /// Creates a gateway for `config`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the TLS backend cannot be
    /// initialised.
    pub fn new(config: UpstreamConfig) -> Result<Self, DomainError> {
        Ok(Self {
            client: client()?,
            config,
        })
    }

    async fn post_json(&self, url: &str, body: &AgentRequest) -> Result<Response, DomainError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &self.config.api_key)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        ensure_success(response)
    }

    async fn read_json(response: Response) -> Result<Value, DomainError> {
        response.json().await.map_err(|e| transport_error(&e))
    }
}

#[async_trait]
impl StoryGateway for HttpStoryGateway {
    #[instrument(skip(self, prompt_text), fields(agent = %self.config.chat_agent))]
    async fn stream_completion(&self, prompt_text: &str) -> Result<ByteStream, DomainError> {
        let body = AgentRequest::user_text(&self.config.chat_agent, prompt_text).streaming();
        let response = self
            .client
            .post(&self.config.api_endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        let response = ensure_success(response)?;
        debug!("upstream stream opened");

        Ok(Box::pin(
            response.bytes_stream().map_err(|e| transport_error(&e)),
        ))
    }

    #[instrument(skip(self, prompt), fields(agent = %self.config.image_agent))]
    async fn generate_image(&self, prompt: &str) -> Result<Value, DomainError> {
        let body = AgentRequest::user_text(&self.config.image_agent, prompt);
        let response = self.post_json(&self.config.image_endpoint, &body).await?;
        Self::read_json(response).await
    }

    #[instrument(skip(self))]
    async fn image_result(&self, request_id: &str) -> Result<Value, DomainError> {
        let response = self
            .client
            .get(&self.config.result_endpoint)
            .query(&[
                ("agent", self.config.image_agent.as_str()),
                ("request_id", request_id),
            ])
            .header(API_KEY_HEADER, &self.config.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        Self::read_json(ensure_success(response)?).await
    }
}
