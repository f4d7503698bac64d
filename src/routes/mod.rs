//! HTTP Routes
//!
//! - `GET /` - Liveness check
//! - `POST /slack/qr_codes_csv` - Relay an uploaded file to the configured Slack channel
//! - `POST /slack/events` - Slack Events API endpoint (signature verified)

pub mod events;
pub mod health;
pub mod upload;
#[cfg(test)]
pub(crate) mod test_support;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::apply_cors;
use crate::models::AppState;

/// Create the application router
///
/// Every route shares the request body limit, CORS policy and request tracing.
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let max_upload_bytes = state.config.server.max_upload_bytes;
    let allowed_origins = state.config.server.cors_allowed_origins.clone();

    let router = Router::new()
        .merge(health::router())
        .merge(upload::router(state.clone()))
        .merge(events::router(state))
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    apply_cors(router, &allowed_origins).layer(TraceLayer::new_for_http())
}
