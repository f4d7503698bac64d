// Middleware for CORS and Slack request verification

pub mod cors;
pub mod slack_signature;

pub use cors::*;
pub use slack_signature::verify_slack_signature;
