use crate::slack::{Channel, SlackApi, SlackError};
use tracing::{debug, error};

/// Outcome of looking a channel up by name
#[derive(Debug)]
pub enum ChannelLookup {
    Found(Channel),
    NotFound,
    Failed(SlackError),
}

/// Find the channel whose name is exactly `name`.
///
/// Channels are listed fresh on every call and scanned in the order Slack
/// returns them; the first exact, case-sensitive match wins.
pub async fn find_conversation(slack: &dyn SlackApi, name: &str) -> ChannelLookup {
    let channels = match slack.list_channels().await {
        Ok(channels) => channels,
        Err(e) => {
            error!(channel = %name, error = %e, "Failed to list Slack channels");
            return ChannelLookup::Failed(e);
        }
    };

    debug!(channel = %name, candidates = channels.len(), "Scanning Slack channels");
    channels
        .into_iter()
        .find(|channel| channel.name == name)
        .map(ChannelLookup::Found)
        .unwrap_or(ChannelLookup::NotFound)
}
