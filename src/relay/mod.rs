//! Relay core
//!
//! The two Slack-facing steps the upload endpoint runs in sequence:
//! - [`resolver::find_conversation`] turns the configured channel name into a channel id
//! - [`publisher::upload_file`] posts the uploaded file into that channel

pub mod publisher;
pub mod resolver;

pub use publisher::{publish_message, upload_file, UploadedFile};
pub use resolver::{find_conversation, ChannelLookup};
