//! `POST /slack/events`
//!
//! Endpoint for Slack's Events API. Every request must carry a valid Slack
//! signature (see [`crate::middleware::slack_signature`]). Slack's
//! `url_verification` handshake is answered with the challenge; other events
//! are acknowledged and logged.

use axum::{
    body::Bytes,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::middleware::verify_slack_signature;
use crate::models::AppState;

pub const EVENTS_PATH: &str = "/slack/events";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(EVENTS_PATH, post(handle_event))
        .route_layer(middleware::from_fn_with_state(state.clone(), verify_slack_signature))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SlackEnvelope {
    UrlVerification {
        challenge: String,
    },
    EventCallback {
        #[serde(default)]
        event_id: Option<String>,
        #[serde(default)]
        event: Option<serde_json::Value>,
    },
    #[serde(other)]
    Other,
}

async fn handle_event(body: Bytes) -> Response {
    let envelope: SlackEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Unreadable Slack event payload");
            return (StatusCode::BAD_REQUEST, "Invalid event payload").into_response();
        }
    };

    match envelope {
        SlackEnvelope::UrlVerification { challenge } => {
            info!("Answering Slack URL verification");
            challenge.into_response()
        }
        SlackEnvelope::EventCallback { event_id, event } => {
            let event_type = event
                .as_ref()
                .and_then(|e| e.get("type"))
                .and_then(|t| t.as_str())
                .unwrap_or("unknown");
            debug!(event_id = ?event_id, event_type = %event_type, "Slack event acknowledged");
            StatusCode::OK.into_response()
        }
        SlackEnvelope::Other => {
            debug!("Slack payload acknowledged");
            StatusCode::OK.into_response()
        }
    }
}
