//! Story generator server entry point.

use std::error::Error;
use std::sync::Arc;

use saga_api::config::StoryConfig;
use saga_api::state::StoryState;
use saga_api::{app, telemetry};
use saga_core::clock::SystemClock;
use saga_story::archive::FsStoryArchive;
use saga_upstream::{HttpStoryGateway, UpstreamConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    telemetry::init();

    tracing::info!("Starting Saga story server");

    // Read configuration from environment and app_config.json.
    let config = StoryConfig::from_env()?;
    let upstream = UpstreamConfig::load(&config.app_config);
    tokio::fs::create_dir_all(&config.data_dir).await?;

    // Build application state.
    let state = StoryState::new(
        Arc::new(SystemClock),
        Arc::new(FsStoryArchive::new(&config.data_dir)),
        Arc::new(HttpStoryGateway::new(upstream)?),
    );

    // Start server.
    let addr = config.server.addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app::story_app(state, &config.data_dir, &config.public_dir),
    )
    .await?;

    Ok(())
}
