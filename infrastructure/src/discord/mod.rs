//! Discord REST adapter
//!
//! Implements [`MessagingGateway`](panicbot_application::MessagingGateway)
//! over the Discord HTTP API (v10). The websocket event stream is not part
//! of this adapter; inbound events reach the engine through
//! [`PanicEventHandler`](panicbot_application::PanicEventHandler).

mod error;
mod gateway;
mod payload;

pub use error::DiscordError;
pub use gateway::{DISCORD_API_BASE, DiscordRestGateway};
