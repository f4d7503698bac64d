//! `POST /slack/qr_codes_csv`
//!
//! Accepts a multipart form with a single `file` part and relays it to the
//! configured Slack channel:
//!
//! 1. read the `file` part (400 `No file provided` when absent, 400 when
//!    more than one file is sent)
//! 2. resolve the configured channel name (500 `Could not find conversation`)
//! 3. upload the file into the channel (500 `Error uploading file`)
//! 4. 200 `File uploaded successfully`
//!
//! Steps 2 and 3 run on their own task and always finish, even when the
//! client goes away mid-request.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::models::AppState;
use crate::relay::{find_conversation, upload_file, ChannelLookup, UploadedFile};
use crate::slack::SlackApi;

pub const UPLOAD_PATH: &str = "/slack/qr_codes_csv";
pub const FILE_FIELD: &str = "file";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(UPLOAD_PATH, post(upload_qr_codes_csv))
        .with_state(state)
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file provided")]
    NoFile,

    #[error("Only one file may be provided")]
    MultipleFiles,

    #[error("{0}")]
    Multipart(#[from] MultipartError),

    #[error("Could not find conversation")]
    ConversationNotFound,

    #[error("Error uploading file")]
    UploadFailed,
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            UploadError::NoFile | UploadError::MultipleFiles => {
                (StatusCode::BAD_REQUEST, message).into_response()
            }
            UploadError::Multipart(e) => (e.status(), e.body_text()).into_response(),
            UploadError::ConversationNotFound | UploadError::UploadFailed => {
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
        }
    }
}

pub async fn upload_qr_codes_csv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<&'static str, UploadError> {
    let channel_name = state.config.slack.channel_name.clone();

    let file = match multipart {
        Ok(multipart) => read_file_field(multipart).await?,
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "Request body is not multipart");
            None
        }
    };

    let file = match file {
        Some(file) if !channel_name.is_empty() => file,
        _ => {
            error!("No file provided");
            return Err(UploadError::NoFile);
        }
    };

    info!(
        file = %file.filename,
        content_type = file.content_type.as_deref().unwrap_or("unknown"),
        bytes = file.content.len(),
        channel = %channel_name,
        "Relaying uploaded file to Slack"
    );

    // Detached from the request so a client disconnect cannot cut the Slack
    // calls short; their result is dropped if nobody is left to receive it.
    let relay = tokio::spawn(relay_to_slack(state.slack.clone(), channel_name, file));
    match relay.await {
        Ok(result) => result?,
        Err(e) => {
            error!(error = %e, "Error uploading file");
            return Err(UploadError::UploadFailed);
        }
    }

    Ok("File uploaded successfully")
}

/// Resolve the channel, then upload the file into it.
async fn relay_to_slack(
    slack: Arc<dyn SlackApi>,
    channel_name: String,
    file: UploadedFile,
) -> Result<(), UploadError> {
    let channel = match find_conversation(slack.as_ref(), &channel_name).await {
        ChannelLookup::Found(channel) => channel,
        ChannelLookup::NotFound => {
            error!(channel = %channel_name, "Could not find conversation");
            return Err(UploadError::ConversationNotFound);
        }
        ChannelLookup::Failed(e) => {
            error!(channel = %channel_name, error = %e, "Could not find conversation");
            return Err(UploadError::ConversationNotFound);
        }
    };

    if let Err(e) = upload_file(slack.as_ref(), &channel.id, &file).await {
        error!(channel = %channel.id, file = %file.filename, error = %e, "Error uploading file");
        return Err(UploadError::UploadFailed);
    }

    Ok(())
}

/// Pull the single `file` part that carries a filename out of the form.
///
/// Parts without a filename are plain form values, not uploads, and are
/// skipped. A second file rejects the whole request before Slack is contacted.
async fn read_file_field(mut multipart: Multipart) -> Result<Option<UploadedFile>, UploadError> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            debug!("Skipping `file` form value without a filename");
            continue;
        };
        if file.is_some() {
            warn!(file = %filename, "Rejecting request with more than one file");
            return Err(UploadError::MultipleFiles);
        }

        let content_type = field.content_type().map(str::to_string);
        let content = field.bytes().await?;
        file = Some(UploadedFile {
            filename,
            content_type,
            content,
        });
    }

    Ok(file)
}
