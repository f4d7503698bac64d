use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use slack_file_relay::{config::Config, routes::create_router, slack::SlackClient, utils::init_logger, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration; a missing variable is fatal
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    init_logger(config.is_production());
    info!("Configuration loaded: {:?}", config);

    let slack = SlackClient::from_config(&config.slack).context("Failed to build Slack client")?;
    let state = AppState::new(config.clone(), Arc::new(slack));

    let app = create_router(state);

    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.server.host, config.server.port))?;
    info!("Server started on port {}", config.server.port);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
