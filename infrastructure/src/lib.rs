//! Infrastructure layer for panicbot
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the Discord REST messaging gateway, the
//! Twilio SMS gateway, the JSONL audit log, and configuration file loading.

pub mod config;
pub mod discord;
pub mod logging;
pub mod twilio;

// Re-export commonly used types
pub use config::{ConfigLoader, FileConfig, FileTwilioConfig, TOKEN_ENV};
pub use discord::{DiscordError, DiscordRestGateway};
pub use logging::JsonlAuditLog;
pub use twilio::{TwilioError, TwilioGateway};
