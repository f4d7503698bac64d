// Logger initialization

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEVELOPMENT_FILTER: &str = "slack_file_relay=debug,tower_http=debug,axum=debug";
const PRODUCTION_FILTER: &str = "slack_file_relay=error,tower_http=error,axum=error";

/// Default filter when `RUST_LOG` is unset
pub fn default_filter(production: bool) -> &'static str {
    if production {
        PRODUCTION_FILTER
    } else {
        DEVELOPMENT_FILTER
    }
}

pub fn init_logger(production: bool) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(production).into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
