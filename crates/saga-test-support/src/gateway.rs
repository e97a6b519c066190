//! Test gateways — in-process `StoryGateway` and `QuizGateway` doubles.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use saga_core::error::DomainError;
use saga_core::gateway::{ByteStream, QuestionRequest, QuizGateway, StoryGateway};
use serde_json::Value;

/// A story gateway that replays canned chunks and JSON and records every
/// prompt it was given.
#[derive(Debug)]
pub struct StubStoryGateway {
    chunks: Vec<&'static str>,
    fail_after: Option<usize>,
    json: Value,
    prompts: Mutex<Vec<String>>,
}

impl StubStoryGateway {
    /// Creates a gateway that streams `chunks` and answers image calls with
    /// `json`.
    #[must_use]
    pub fn new(chunks: Vec<&'static str>, json: Value) -> Self {
        Self {
            chunks,
            fail_after: None,
            json,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Makes completion streams yield an upstream error after `sent` chunks,
    /// followed by the remaining chunks.
    #[must_use]
    pub fn failing_after(mut self, sent: usize) -> Self {
        self.fail_after = Some(sent);
        self
    }

    /// Returns a snapshot of the prompts and request ids received, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn record(&self, prompt: &str) {
        self.prompts.lock().unwrap().push(prompt.to_owned());
    }
}

#[async_trait]
impl StoryGateway for StubStoryGateway {
    async fn stream_completion(&self, prompt_text: &str) -> Result<ByteStream, DomainError> {
        self.record(prompt_text);
        let mut chunks: Vec<Result<Bytes, DomainError>> = self
            .chunks
            .iter()
            .map(|c| Ok(Bytes::from_static(c.as_bytes())))
            .collect();
        if let Some(sent) = self.fail_after {
            chunks.insert(sent.min(chunks.len()), Err(DomainError::Upstream { status: 502 }));
        }
        Ok(Box::pin(stream::iter(chunks)))
    }

    async fn generate_image(&self, prompt: &str) -> Result<Value, DomainError> {
        self.record(prompt);
        Ok(self.json.clone())
    }

    async fn image_result(&self, request_id: &str) -> Result<Value, DomainError> {
        self.record(request_id);
        Ok(self.json.clone())
    }
}

/// A quiz gateway that hands out queued image-edit results and records the
/// calls it received.
#[derive(Debug)]
pub struct StubQuizGateway {
    edit_results: Mutex<VecDeque<Option<String>>>,
    download: Vec<u8>,
    questions: Vec<Value>,
    edit_calls: Mutex<Vec<(String, String, String)>>,
    question_requests: Mutex<Vec<QuestionRequest>>,
}

impl StubQuizGateway {
    /// Creates a gateway whose `edit_image` calls return `edit_results` in
    /// order (then `None`), and whose downloads all return `download`.
    #[must_use]
    pub fn new(edit_results: Vec<Option<String>>, download: Vec<u8>) -> Self {
        Self {
            edit_results: Mutex::new(edit_results.into()),
            download,
            questions: Vec::new(),
            edit_calls: Mutex::new(Vec::new()),
            question_requests: Mutex::new(Vec::new()),
        }
    }

    /// Sets the question set returned by `generate_questions`.
    #[must_use]
    pub fn with_questions(mut self, questions: Vec<Value>) -> Self {
        self.questions = questions;
        self
    }

    /// Returns `(api_key, image_data_uri, prompt)` for every edit call.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn edit_calls(&self) -> Vec<(String, String, String)> {
        self.edit_calls.lock().unwrap().clone()
    }

    /// Returns every question request received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn question_requests(&self) -> Vec<QuestionRequest> {
        self.question_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuizGateway for StubQuizGateway {
    async fn edit_image(
        &self,
        api_key: &str,
        image_data_uri: &str,
        prompt: &str,
    ) -> Result<Option<String>, DomainError> {
        self.edit_calls.lock().unwrap().push((
            api_key.to_owned(),
            image_data_uri.to_owned(),
            prompt.to_owned(),
        ));
        Ok(self.edit_results.lock().unwrap().pop_front().flatten())
    }

    async fn download(&self, _url: &str) -> Result<Bytes, DomainError> {
        Ok(Bytes::from(self.download.clone()))
    }

    async fn generate_questions(
        &self,
        _api_key: &str,
        request: &QuestionRequest,
    ) -> Result<Vec<Value>, DomainError> {
        self.question_requests.lock().unwrap().push(request.clone());
        Ok(self.questions.clone())
    }
}

/// A gateway whose every call fails as if upstream answered `status`.
#[derive(Debug, Clone, Copy)]
pub struct FailingGateway {
    /// Status reported by each failure.
    pub status: u16,
}

impl FailingGateway {
    fn error(self) -> DomainError {
        DomainError::Upstream {
            status: self.status,
        }
    }
}

#[async_trait]
impl StoryGateway for FailingGateway {
    async fn stream_completion(&self, _prompt_text: &str) -> Result<ByteStream, DomainError> {
        Err(self.error())
    }

    async fn generate_image(&self, _prompt: &str) -> Result<Value, DomainError> {
        Err(self.error())
    }

    async fn image_result(&self, _request_id: &str) -> Result<Value, DomainError> {
        Err(self.error())
    }
}

#[async_trait]
impl QuizGateway for FailingGateway {
    async fn edit_image(
        &self,
        _api_key: &str,
        _image_data_uri: &str,
        _prompt: &str,
    ) -> Result<Option<String>, DomainError> {
        Err(self.error())
    }

    async fn download(&self, _url: &str) -> Result<Bytes, DomainError> {
        Err(self.error())
    }

    async fn generate_questions(
        &self,
        _api_key: &str,
        _request: &QuestionRequest,
    ) -> Result<Vec<Value>, DomainError> {
        Err(self.error())
    }
}
