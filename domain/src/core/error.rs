//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Ban target cannot be empty")]
    EmptyBanTarget,

    #[error("A member cannot start a ban vote against themselves")]
    SelfBan,

    #[error("Alert message cannot be empty")]
    EmptyAlertMessage,

    #[error("Invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },
}
