//! Slack Web API access
//!
//! The relay only needs three Slack operations, exposed through [`SlackApi`]:
//! - `conversations.list` to find a channel by name
//! - the external file upload flow to post a file into a channel
//! - `chat.postMessage` to post plain text
//!
//! [`SlackClient`] is the HTTP implementation. Handlers receive the client as
//! an `Arc<dyn SlackApi>` so tests can substitute a fake.

pub mod client;
#[cfg(test)]
pub mod fake;

pub use client::SlackClient;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by Slack calls
#[derive(Debug, Error)]
pub enum SlackError {
    #[error("Slack request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Slack API error: {0}")]
    Api(String),

    #[error("Slack returned HTTP status {0}")]
    Status(u16),

    #[error("Unexpected Slack response: {0}")]
    InvalidResponse(String),
}

pub type SlackResult<T> = std::result::Result<T, SlackError>;

/// A channel as listed by Slack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
}

/// A single file to post into a channel
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub channel_id: String,
    pub filename: String,
    pub title: String,
    pub initial_comment: String,
    pub content: Bytes,
}

/// Receipt for a completed upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReceipt {
    pub file_id: String,
    pub title: Option<String>,
    pub permalink: Option<String>,
}

/// Receipt for a posted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceipt {
    pub channel: String,
    pub ts: String,
}

#[async_trait]
pub trait SlackApi: Send + Sync {
    /// All channels visible to the bot, in the order Slack returns them.
    async fn list_channels(&self) -> SlackResult<Vec<Channel>>;

    async fn upload_file(&self, upload: FileUpload) -> SlackResult<FileReceipt>;

    async fn post_message(&self, channel_id: &str, text: &str) -> SlackResult<MessageReceipt>;
}
