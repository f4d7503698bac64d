// In-memory SlackApi used by resolver, publisher and route tests

use super::{Channel, FileReceipt, FileUpload, MessageReceipt, SlackApi, SlackError, SlackResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct FakeSlack {
    channels: Option<Vec<Channel>>,
    fail_uploads: bool,
    upload_delay: Option<Duration>,
    list_calls: AtomicUsize,
    uploads: Mutex<Vec<FileUpload>>,
    messages: Mutex<Vec<(String, String)>>,
}

impl FakeSlack {
    pub fn with_channels(channels: &[(&str, &str)]) -> Self {
        Self {
            channels: Some(
                channels
                    .iter()
                    .map(|(name, id)| Channel {
                        id: id.to_string(),
                        name: name.to_string(),
                    })
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Every `list_channels` call fails as if the network were down.
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn failing_uploads(mut self) -> Self {
        self.fail_uploads = true;
        self
    }

    /// Uploads take `delay` before they are recorded.
    pub fn with_upload_delay(mut self, delay: Duration) -> Self {
        self.upload_delay = Some(delay);
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<FileUpload> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl SlackApi for FakeSlack {
    async fn list_channels(&self) -> SlackResult<Vec<Channel>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.channels
            .clone()
            .ok_or_else(|| SlackError::Api("conversations.list: fatal_error".to_string()))
    }

    async fn upload_file(&self, upload: FileUpload) -> SlackResult<FileReceipt> {
        if let Some(delay) = self.upload_delay {
            tokio::time::sleep(delay).await;
        }
        let file_id = format!("F{}", self.uploads.lock().unwrap().len() + 1);
        let title = upload.title.clone();
        self.uploads.lock().unwrap().push(upload);

        if self.fail_uploads {
            return Err(SlackError::Api("files.completeUploadExternal: not_in_channel".to_string()));
        }
        Ok(FileReceipt {
            file_id,
            title: Some(title),
            permalink: None,
        })
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> SlackResult<MessageReceipt> {
        self.messages
            .lock()
            .unwrap()
            .push((channel_id.to_string(), text.to_string()));
        Ok(MessageReceipt {
            channel: channel_id.to_string(),
            ts: "1700000000.000100".to_string(),
        })
    }
}
