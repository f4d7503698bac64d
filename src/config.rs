use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_SLACK_API_BASE_URL: &str = "https://slack.com/api";

/// Errors raised while reading configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required to run this app")]
    Missing(&'static str),

    #[error("{var} has an invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub slack: SlackConfig,
    pub environment: String,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

#[derive(Clone)]
pub struct SlackConfig {
    pub bot_token: String,
    pub signing_secret: String,
    pub channel_name: String,
    pub api_base_url: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server", &self.server)
            .field("slack", &self.slack)
            .field("environment", &self.environment)
            .finish()
    }
}

impl fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackConfig")
            .field("bot_token", &"<redacted>")
            .field("signing_secret", &"<redacted>")
            .field("channel_name", &self.channel_name)
            .field("api_base_url", &self.api_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first
    /// when one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Checked in this order so the first missing value is the one reported.
        let bot_token = get("SLACK_BOT_TOKEN").ok_or(ConfigError::Missing("SLACK_BOT_TOKEN"))?;
        let signing_secret =
            get("SLACK_SIGNING_SECRET").ok_or(ConfigError::Missing("SLACK_SIGNING_SECRET"))?;
        let channel_name = get("CHANNEL_NAME").ok_or(ConfigError::Missing("CHANNEL_NAME"))?;

        Ok(Self {
            server: ServerConfig {
                port: parse_or("PORT", get("PORT"), 3000)?,
                host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                cors_allowed_origins: get("ALLOWED_ORIGINS")
                    .unwrap_or_else(|| "*".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                max_upload_bytes: parse_or("MAX_UPLOAD_BYTES", get("MAX_UPLOAD_BYTES"), 25 * 1024 * 1024)?,
            },
            slack: SlackConfig {
                bot_token,
                signing_secret,
                channel_name,
                api_base_url: get("SLACK_API_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_SLACK_API_BASE_URL.to_string()),
                timeout_secs: parse_or("SLACK_TIMEOUT_SECS", get("SLACK_TIMEOUT_SECS"), 30)?,
            },
            environment: get("APP_ENV").unwrap_or_else(|| "development".to_string()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}
