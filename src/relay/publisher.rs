use bytes::Bytes;
use tracing::{error, info};

use crate::slack::{FileReceipt, FileUpload, MessageReceipt, SlackApi, SlackResult};

/// A file received over HTTP, held in memory for the duration of one request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub content: Bytes,
}

/// Comment posted alongside every uploaded file
pub fn upload_comment(filename: &str) -> String {
    format!("QR codes générés : {}", filename)
}

/// Upload `file` into the channel `channel_id`.
///
/// The file title is its original name. The content is passed to Slack as-is,
/// even when empty.
pub async fn upload_file(
    slack: &dyn SlackApi,
    channel_id: &str,
    file: &UploadedFile,
) -> SlackResult<FileReceipt> {
    let upload = FileUpload {
        channel_id: channel_id.to_string(),
        filename: file.filename.clone(),
        title: file.filename.clone(),
        initial_comment: upload_comment(&file.filename),
        content: file.content.clone(),
    };

    match slack.upload_file(upload).await {
        Ok(receipt) => {
            info!(channel = %channel_id, file = %file.filename, file_id = %receipt.file_id, "File uploaded to Slack");
            Ok(receipt)
        }
        Err(e) => {
            error!(channel = %channel_id, file = %file.filename, error = %e, "Slack file upload failed");
            Err(e)
        }
    }
}

/// Post a plain text message into `channel_id`.
pub async fn publish_message(
    slack: &dyn SlackApi,
    channel_id: &str,
    text: &str,
) -> SlackResult<MessageReceipt> {
    slack
        .post_message(channel_id, text)
        .await
        .inspect(|receipt| info!(channel = %receipt.channel, ts = %receipt.ts, "Message posted to Slack"))
        .inspect_err(|e| error!(channel = %channel_id, error = %e, "Slack message post failed"))
}
