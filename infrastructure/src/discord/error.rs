//! Discord adapter error types

use panicbot_application::GatewayError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscordError {
    #[error("{0} cannot be empty. Did you forget to set it in the config?")]
    MissingCredential(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Discord API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Guild has no text channel to post in")]
    NoPrimaryChannel,
}

impl From<DiscordError> for GatewayError {
    fn from(err: DiscordError) -> Self {
        match err {
            DiscordError::Http(e) if e.is_connect() || e.is_timeout() => {
                GatewayError::ConnectionError(e.to_string())
            }
            DiscordError::Api { status: 403, message } => GatewayError::PermissionDenied(message),
            DiscordError::Api { status: 404, message } => GatewayError::NotFound(message),
            DiscordError::Api { status: 429, .. } => GatewayError::RateLimited,
            DiscordError::NoPrimaryChannel => {
                GatewayError::NotFound("primary channel".to_string())
            }
            other => GatewayError::RequestFailed(other.to_string()),
        }
    }
}
