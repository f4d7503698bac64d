use std::sync::Arc;

use crate::config::Config;
use crate::slack::SlackApi;

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub slack: Arc<dyn SlackApi>,
}

impl AppState {
    pub fn new(config: Config, slack: Arc<dyn SlackApi>) -> Self {
        Self { config, slack }
    }
}
