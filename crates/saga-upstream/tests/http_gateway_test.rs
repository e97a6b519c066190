//! Gateway tests against a local HTTP server that records what it receives.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use futures::TryStreamExt;
use saga_core::error::DomainError;
use saga_core::gateway::{QuestionRequest, QuizGateway, StoryGateway};
use saga_upstream::{HttpQuizGateway, HttpStoryGateway, QuizUpstreamConfig, UpstreamConfig};
use serde_json::{Value, json};

/// One request as the upstream saw it.
#[derive(Debug, Clone)]
struct Received {
    method: Method,
    path: String,
    query: Option<String>,
    api_key: Option<String>,
    content_type: Option<String>,
    body: Bytes,
}

impl Received {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

#[derive(Clone)]
struct Upstream {
    status: StatusCode,
    reply: Bytes,
    received: Arc<Mutex<Vec<Received>>>,
}

async fn record(
    State(upstream): State<Upstream>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Bytes) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    upstream.received.lock().unwrap().push(Received {
        method,
        path: uri.path().to_owned(),
        query: uri.query().map(str::to_owned),
        api_key: header("x-api-key"),
        content_type: header("content-type"),
        body,
    });
    (upstream.status, upstream.reply.clone())
}

/// Starts an upstream answering every request with `status` and `reply`.
/// Returns its base URL and the log of received requests.
async fn serve(status: StatusCode, reply: impl Into<Bytes>) -> (String, Arc<Mutex<Vec<Received>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(record).with_state(Upstream {
        status,
        reply: reply.into(),
        received: Arc::clone(&received),
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), received)
}

fn story_config(base: &str) -> UpstreamConfig {
    UpstreamConfig {
        api_key: "story-key".to_owned(),
        api_endpoint: format!("{base}/chat"),
        chat_agent: "writer".to_owned(),
        image_endpoint: format!("{base}/image"),
        image_agent: "painter".to_owned(),
        result_endpoint: format!("{base}/result"),
    }
}

fn quiz_config(base: &str) -> QuizUpstreamConfig {
    QuizUpstreamConfig {
        image_edit_endpoint: Some(format!("{base}/edit")),
        image_edit_agent: "editor".to_owned(),
        chat_endpoint: Some(format!("{base}/chat")),
        chat_agent: "quizmaster".to_owned(),
    }
}

fn only(received: &Arc<Mutex<Vec<Received>>>) -> Received {
    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    received[0].clone()
}

#[tokio::test]
async fn test_stream_completion_posts_streaming_envelope_and_relays_bytes() {
    // Arrange
    let (base, received) = serve(StatusCode::OK, "data: {\"t\":\"Once\"}\n\ndata: [DONE]\n\n").await;
    let gateway = HttpStoryGateway::new(story_config(&base)).unwrap();

    // Act
    let stream = gateway.stream_completion("a storm at sea").await.unwrap();
    let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();

    // Assert
    assert_eq!(chunks.concat(), b"data: {\"t\":\"Once\"}\n\ndata: [DONE]\n\n");
    let request = only(&received);
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/chat");
    assert_eq!(request.api_key.as_deref(), Some("story-key"));
    assert_eq!(request.content_type.as_deref(), Some("application/json"));
    assert_eq!(
        request.json(),
        json!({
            "messages": [{ "role": "user", "content": [{ "type": "text", "text": "a storm at sea" }] }],
            "agent": "writer",
            "stream": true
        })
    );
}

#[tokio::test]
async fn test_generate_image_omits_stream_flag_and_returns_reply() {
    let (base, received) = serve(StatusCode::OK, r#"{"request_id":"r-1"}"#).await;
    let gateway = HttpStoryGateway::new(story_config(&base)).unwrap();

    let reply = gateway.generate_image("a lighthouse").await.unwrap();

    assert_eq!(reply, json!({ "request_id": "r-1" }));
    let request = only(&received);
    assert_eq!(request.path, "/image");
    assert_eq!(request.api_key.as_deref(), Some("story-key"));
    let body = request.json();
    assert_eq!(body["agent"], "painter");
    assert!(body.get("stream").is_none());
}

#[tokio::test]
async fn test_image_result_queries_agent_and_request_id() {
    let (base, received) = serve(StatusCode::OK, r#"{"status":"done"}"#).await;
    let gateway = HttpStoryGateway::new(story_config(&base)).unwrap();

    let reply = gateway.image_result("r-9").await.unwrap();

    assert_eq!(reply["status"], "done");
    let request = only(&received);
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.path, "/result");
    assert_eq!(request.query.as_deref(), Some("agent=painter&request_id=r-9"));
    assert_eq!(request.api_key.as_deref(), Some("story-key"));
}

#[tokio::test]
async fn test_non_success_status_becomes_upstream_error() {
    let (base, _) = serve(StatusCode::TOO_MANY_REQUESTS, "slow down").await;
    let gateway = HttpStoryGateway::new(story_config(&base)).unwrap();

    let stream = gateway.stream_completion("x").await;
    let image = gateway.generate_image("x").await;

    assert!(matches!(stream, Err(DomainError::Upstream { status: 429 })));
    assert!(matches!(image, Err(DomainError::Upstream { status: 429 })));
}

#[tokio::test]
async fn test_edit_image_sends_caller_key_and_image_part() {
    // Arrange
    let (base, received) = serve(StatusCode::OK, r#"{"data":[{"url":"https://img/1.png"}]}"#).await;
    let gateway = HttpQuizGateway::new(quiz_config(&base)).unwrap();

    // Act
    let url = gateway
        .edit_image("author-key", "data:image/png;base64,AAAA", "add a hat")
        .await
        .unwrap();

    // Assert
    assert_eq!(url.as_deref(), Some("https://img/1.png"));
    let request = only(&received);
    assert_eq!(request.path, "/edit");
    assert_eq!(request.api_key.as_deref(), Some("author-key"));
    let body = request.json();
    assert_eq!(body["agent"], "editor");
    assert_eq!(
        body["messages"][0]["content"],
        json!([
            { "type": "text", "text": "add a hat" },
            { "type": "image_url", "image_url": { "url": "data:image/png;base64,AAAA" } }
        ])
    );
}

#[tokio::test]
async fn test_generate_questions_parses_fenced_reply() {
    let reply = json!({
        "choices": [{ "message": { "content": "```json\n[{\"id\":1,\"question\":\"q\"}]\n```" } }]
    });
    let (base, received) = serve(StatusCode::OK, reply.to_string()).await;
    let gateway = HttpQuizGateway::new(quiz_config(&base)).unwrap();
    let request = QuestionRequest {
        topic: "tides".to_owned(),
        difficulties: vec![1],
        num_questions: 1,
    };

    let questions = gateway.generate_questions("author-key", &request).await.unwrap();

    assert_eq!(questions, vec![json!({ "id": 1, "question": "q" })]);
    let sent = only(&received);
    assert_eq!(sent.path, "/chat");
    assert_eq!(sent.json()["agent"], "quizmaster");
}

#[tokio::test]
async fn test_download_returns_body_bytes() {
    let (base, received) = serve(StatusCode::OK, &b"\x89PNG"[..]).await;
    let gateway = HttpQuizGateway::new(quiz_config(&base)).unwrap();

    let bytes = gateway.download(&format!("{base}/img/1.png")).await.unwrap();

    assert_eq!(&bytes[..], b"\x89PNG");
    assert_eq!(only(&received).method, Method::GET);
}

#[tokio::test]
async fn test_unconfigured_quiz_endpoint_is_infrastructure_error() {
    let gateway = HttpQuizGateway::new(QuizUpstreamConfig::default()).unwrap();

    let result = gateway.edit_image("k", "data:,", "p").await;

    assert!(matches!(result, Err(DomainError::Infrastructure(_))));
}
