//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use saga_core::gateway::{QuizGateway, StoryGateway};
use saga_quiz::admin::PasswordFile;
use saga_quiz::repository::FileCharacterRepository;
use saga_story::archive::FsStoryArchive;
use saga_test_support::FixedClock;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use saga_api::app;
use saga_api::state::{QuizState, StoryState};

/// Admin password written into every quiz test workspace.
pub const ADMIN_PASSWORD: &str = "open-sesame";

/// Files of a quiz server under test.
pub struct QuizWorld {
    pub dir: TempDir,
}

impl QuizWorld {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("password_admin.txt"), format!("{ADMIN_PASSWORD}\n")).unwrap();
        std::fs::create_dir_all(dir.path().join("uploads")).unwrap();
        Self { dir }
    }

    pub fn uploads(&self) -> PathBuf {
        self.dir.path().join("uploads")
    }

    /// Writes a character with `images` reveal stages and the given
    /// `(question, answer)` pairs straight to disk.
    pub fn seed(&self, id: u32, name: &str, owner: &str, status: &str, images: usize, qa: &[(&str, &str)]) {
        let folder = self.uploads().join(format!("{id}_{}", name.to_lowercase()));
        std::fs::create_dir_all(&folder).unwrap();
        for n in 0..images {
            std::fs::write(folder.join(format!("{n}.png")), [n as u8]).unwrap();
        }
        let questions: Vec<Value> = qa
            .iter()
            .enumerate()
            .map(|(i, (q, a))| {
                json!({
                    "id": i + 1,
                    "question": q,
                    "options": [a, "x", "y", "z"],
                    "answer": a
                })
            })
            .collect();
        std::fs::write(folder.join("questions.json"), serde_json::to_vec(&questions).unwrap()).unwrap();

        let file = self.dir.path().join("characters.json");
        let mut characters: Vec<Value> = std::fs::read(&file)
            .map(|b| serde_json::from_slice(&b).unwrap())
            .unwrap_or_default();
        characters.push(json!({
            "id": id,
            "name": name,
            "original_image": folder.join("0.png").to_string_lossy(),
            "folder": folder.to_string_lossy(),
            "owner": owner,
            "status": status
        }));
        std::fs::write(&file, serde_json::to_vec_pretty(&characters).unwrap()).unwrap();
    }

    pub fn app(&self, gateway: Arc<dyn QuizGateway>) -> Router {
        let state = QuizState::new(
            Arc::new(FileCharacterRepository::new(
                self.dir.path().join("characters.json"),
                self.uploads(),
            )),
            gateway,
            PasswordFile::new(self.dir.path().join("password_admin.txt")),
            self.dir.path().join("suggested_prompts.json"),
        );
        app::quiz_app(state)
    }
}

/// Fixed timestamp used across story tests.
pub fn fixed_clock() -> FixedClock {
    FixedClock::at(2026, 1, 15, 10, 0, 0)
}

/// Builds the story server over `root/data` and `root/public`.
pub fn story_app(root: &Path, gateway: Arc<dyn StoryGateway>) -> Router {
    let data_dir = root.join("data");
    let public_dir = root.join("public");
    std::fs::create_dir_all(&data_dir).unwrap();
    std::fs::create_dir_all(&public_dir).unwrap();
    let state = StoryState::new(
        Arc::new(fixed_clock()),
        Arc::new(FsStoryArchive::new(&data_dir)),
        gateway,
    );
    app::story_app(state, &data_dir, &public_dir)
}

/// Sends `request` and returns status, headers, and the collected body.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body)
}

async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send(app, request).await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send_json(app, request).await
}

/// Send a GET request with optional headers and return the JSON response.
pub async fn get_json(app: Router, uri: &str, headers: &[(&str, &str)]) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    send_json(app, builder.body(Body::empty()).unwrap()).await
}

/// Send a request with an urlencoded form body and return the JSON response.
pub async fn send_form(
    app: Router,
    method: &str,
    uri: &str,
    fields: &[(&str, &str)],
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{k}={}", v.replace(' ', "+")))
        .collect::<Vec<_>>()
        .join("&");
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    send_json(app, builder.body(Body::from(body)).unwrap()).await
}

/// Encodes a multipart body; `file` is `(field, file_name, bytes)`.
pub fn multipart(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> (String, Vec<u8>) {
    const BOUNDARY: &str = "saga-test-boundary";
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
    }
    if let Some((name, file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
