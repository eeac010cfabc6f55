//! Telephony gateway port (SMS delivery for administrator alerts).

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while sending a text message
#[derive(Error, Debug)]
pub enum TelephonyError {
    #[error("Invalid phone number: {0}")]
    InvalidNumber(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Provider rejected message (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

#[async_trait]
pub trait TelephonyGateway: Send + Sync {
    /// Send an SMS `body` to `to` (E.164 number)
    async fn send_text(&self, to: &str, body: &str) -> Result<(), TelephonyError>;
}

/// Telephony gateway used when no provider is configured.
pub struct NoTelephony;

#[async_trait]
impl TelephonyGateway for NoTelephony {
    async fn send_text(&self, to: &str, _body: &str) -> Result<(), TelephonyError> {
        debug!(to, "Telephony not configured, dropping text message");
        Ok(())
    }
}
