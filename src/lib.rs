// Slack File Relay - forwards uploaded files to a Slack channel

pub mod config;
pub mod middleware;
pub mod models;
pub mod relay;    // Channel lookup and file publishing
pub mod routes;
pub mod slack;    // Slack Web API client
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
