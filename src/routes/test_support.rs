// Helpers for driving the router in tests

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use axum::response::Response;

use crate::config::Config;
use crate::models::AppState;
use crate::slack::fake::FakeSlack;

pub const SIGNING_SECRET: &str = "test-signing-secret";
const BOUNDARY: &str = "relay-test-boundary";

pub fn test_config(channel_name: &str) -> Config {
    let mut config = Config::from_lookup(|key| match key {
        "SLACK_BOT_TOKEN" => Some("xoxb-test".to_string()),
        "SLACK_SIGNING_SECRET" => Some(SIGNING_SECRET.to_string()),
        "CHANNEL_NAME" => Some("placeholder".to_string()),
        _ => None,
    })
    .unwrap();
    config.slack.channel_name = channel_name.to_string();
    config
}

pub fn test_state(slack: Arc<FakeSlack>, channel_name: &str) -> AppState {
    AppState::new(test_config(channel_name), slack)
}

pub struct Part<'a> {
    name: &'a str,
    filename: Option<&'a str>,
    content: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(name: &'a str, filename: &'a str, content: &'a [u8]) -> Self {
        Self {
            name,
            filename: Some(filename),
            content,
        }
    }

    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            filename: None,
            content: value.as_bytes(),
        }
    }
}

/// Content type and encoded body of a multipart form
pub fn multipart_body(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/csv\r\n\r\n",
                    part.name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name).as_bytes(),
            ),
        }
        body.extend_from_slice(part.content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

pub fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
    let (content_type, body) = multipart_body(parts);
    Request::builder()
        .method("POST")
        .uri(crate::routes::upload::UPLOAD_PATH)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
