// Slack Web API client
// Methods used:
//   conversations.list             https://api.slack.com/methods/conversations.list
//   files.getUploadURLExternal     https://api.slack.com/methods/files.getUploadURLExternal
//   files.completeUploadExternal   https://api.slack.com/methods/files.completeUploadExternal
//   chat.postMessage               https://api.slack.com/methods/chat.postMessage
//
// Every Web API response carries `"ok": bool`; HTTP 200 with `ok: false` is an error.

use super::{Channel, FileReceipt, FileUpload, MessageReceipt, SlackApi, SlackError, SlackResult};
use crate::config::SlackConfig;
use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

// Page size for conversations.list (Slack recommends <= 200)
const CHANNEL_PAGE_LIMIT: &str = "200";

pub struct SlackClient {
    client: Client,
    token: String,
    base_url: String,
}

// Response types for Slack API
#[derive(Deserialize)]
struct ConversationsListResponse {
    #[serde(default)]
    channels: Vec<SlackChannel>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct SlackChannel {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Deserialize)]
struct UploadUrlResponse {
    upload_url: String,
    file_id: String,
}

#[derive(Deserialize)]
struct CompleteUploadResponse {
    #[serde(default)]
    files: Vec<SlackFile>,
}

#[derive(Deserialize)]
struct SlackFile {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    permalink: Option<String>,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    channel: String,
    ts: String,
}

// Request types for Slack API
#[derive(Serialize)]
struct CompleteUploadRequest<'a> {
    files: [CompleteUploadFile<'a>; 1],
    channel_id: &'a str,
    initial_comment: &'a str,
}

#[derive(Serialize)]
struct CompleteUploadFile<'a> {
    id: &'a str,
    title: &'a str,
}

#[derive(Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
}

impl SlackClient {
    /// Create a client against `base_url` (normally `https://slack.com/api`).
    ///
    /// `timeout` bounds every outbound request; `None` leaves requests unbounded.
    pub fn new(token: &str, base_url: &str, timeout: Option<Duration>) -> SlackResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            token: token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Configure client from config. A timeout of zero seconds disables the timeout.
    pub fn from_config(config: &SlackConfig) -> SlackResult<Self> {
        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        Self::new(&config.bot_token, &config.api_base_url, timeout)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn list_channels_page(&self, cursor: &str) -> SlackResult<ConversationsListResponse> {
        let mut request = self
            .client
            .get(self.method_url("conversations.list"))
            .bearer_auth(&self.token)
            .query(&[("limit", CHANNEL_PAGE_LIMIT)]);
        if !cursor.is_empty() {
            request = request.query(&[("cursor", cursor)]);
        }

        let response = request.send().await?;
        read_response(response, "conversations.list").await
    }

    async fn get_upload_url(&self, filename: &str, length: usize) -> SlackResult<UploadUrlResponse> {
        let length = length.to_string();
        let response = self
            .client
            .post(self.method_url("files.getUploadURLExternal"))
            .bearer_auth(&self.token)
            .form(&[("filename", filename), ("length", length.as_str())])
            .send()
            .await?;

        read_response(response, "files.getUploadURLExternal").await
    }

    async fn send_file_content(&self, upload_url: &str, upload: &FileUpload) -> SlackResult<()> {
        let length = upload.content.len() as u64;
        let part = multipart::Part::stream_with_length(upload.content.clone(), length)
            .file_name(upload.filename.clone());
        let form = multipart::Form::new().part("file", part);

        let response = self.client.post(upload_url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SlackError::Status(status.as_u16()));
        }
        Ok(())
    }

    async fn complete_upload(&self, file_id: &str, upload: &FileUpload) -> SlackResult<CompleteUploadResponse> {
        let body = CompleteUploadRequest {
            files: [CompleteUploadFile {
                id: file_id,
                title: &upload.title,
            }],
            channel_id: &upload.channel_id,
            initial_comment: &upload.initial_comment,
        };

        let response = self
            .client
            .post(self.method_url("files.completeUploadExternal"))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        read_response(response, "files.completeUploadExternal").await
    }
}

#[async_trait]
impl SlackApi for SlackClient {
    async fn list_channels(&self) -> SlackResult<Vec<Channel>> {
        let mut channels = Vec::new();
        let mut cursor = String::new();

        loop {
            let page = self.list_channels_page(&cursor).await?;
            channels.extend(page.channels.into_iter().map(|c| Channel {
                id: c.id,
                name: c.name,
            }));

            cursor = page
                .response_metadata
                .map(|m| m.next_cursor)
                .unwrap_or_default();
            if cursor.is_empty() {
                break;
            }
            debug!(fetched = channels.len(), "Fetching next page of conversations.list");
        }

        Ok(channels)
    }

    async fn upload_file(&self, upload: FileUpload) -> SlackResult<FileReceipt> {
        let target = self.get_upload_url(&upload.filename, upload.content.len()).await?;
        debug!(file_id = %target.file_id, "Obtained Slack upload URL");

        self.send_file_content(&target.upload_url, &upload).await?;

        let completed = self.complete_upload(&target.file_id, &upload).await?;
        let file = completed
            .files
            .into_iter()
            .find(|f| f.id == target.file_id)
            .ok_or_else(|| {
                SlackError::InvalidResponse(format!(
                    "files.completeUploadExternal did not return file {}",
                    target.file_id
                ))
            })?;

        Ok(FileReceipt {
            file_id: file.id,
            title: file.title,
            permalink: file.permalink,
        })
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> SlackResult<MessageReceipt> {
        let response = self
            .client
            .post(self.method_url("chat.postMessage"))
            .bearer_auth(&self.token)
            .json(&PostMessageRequest {
                channel: channel_id,
                text,
            })
            .send()
            .await?;

        let posted: PostMessageResponse = read_response(response, "chat.postMessage").await?;
        Ok(MessageReceipt {
            channel: posted.channel,
            ts: posted.ts,
        })
    }
}

/// Check HTTP status and the `ok` flag, then decode the method-specific body.
async fn read_response<T: DeserializeOwned>(response: Response, method: &str) -> SlackResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(SlackError::Status(status.as_u16()));
    }

    let body: Value = response.json().await?;
    if !body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
        let error = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown_error");
        return Err(SlackError::Api(format!("{}: {}", method, error)));
    }

    serde_json::from_value(body)
        .map_err(|e| SlackError::InvalidResponse(format!("{}: {}", method, e)))
}
