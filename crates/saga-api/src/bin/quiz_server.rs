//! Reveal quiz API server entry point.

use std::error::Error;
use std::sync::Arc;

use saga_api::config::QuizConfig;
use saga_api::state::QuizState;
use saga_api::{app, telemetry};
use saga_quiz::admin::PasswordFile;
use saga_quiz::repository::FileCharacterRepository;
use saga_upstream::HttpQuizGateway;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    telemetry::init();

    tracing::info!("Starting Saga quiz server");

    // Read configuration from environment.
    let config = QuizConfig::from_env()?;
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    // Build application state.
    let repository = Arc::new(FileCharacterRepository::new(
        &config.characters_file,
        &config.upload_dir,
    ));
    let gateway = Arc::new(HttpQuizGateway::new(config.upstream.clone())?);
    let state = QuizState::new(
        repository,
        gateway,
        PasswordFile::new(&config.admin_password_file),
        config.prompts_file.clone(),
    );

    // Start server.
    let addr = config.server.addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app::quiz_app(state)).await?;

    Ok(())
}
