//! Messaging gateway port
//!
//! Defines the outbound interface to the chat platform: direct messages,
//! actionable vote prompts, channel messages, bans and member enumeration.

use async_trait::async_trait;
use panicbot_domain::{ChannelId, GuildMember, MemberId};
use thiserror::Error;

/// Errors that can occur during messaging gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Missing permission: {0}")]
    PermissionDenied(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Other error: {0}")]
    Other(String),
}

/// An actionable prompt sent to an eligible voter.
///
/// `token` is the vote's correlation token; the platform hands it back
/// unchanged when the voter presses the button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotePrompt {
    pub content: String,
    pub title: String,
    pub description: String,
    pub button_label: String,
    pub token: String,
}

/// Gateway to the chat platform
///
/// The application layer only talks to the platform through this port.
/// Implementations (adapters) live in the infrastructure and presentation
/// layers.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Send a plain direct message to a member
    async fn send_dm(&self, member: &MemberId, text: &str) -> Result<(), GatewayError>;

    /// Send a direct message carrying a cast-vote button
    async fn send_vote_prompt(
        &self,
        member: &MemberId,
        prompt: &VotePrompt,
    ) -> Result<(), GatewayError>;

    /// Post to a channel; `None` means the primary channel
    async fn send_channel_message(
        &self,
        channel: Option<&ChannelId>,
        text: &str,
    ) -> Result<(), GatewayError>;

    /// Ban a member, purging `purge_days` days of their messages
    async fn ban_member(
        &self,
        member: &MemberId,
        reason: &str,
        purge_days: u8,
    ) -> Result<(), GatewayError>;

    /// Enumerate every guild member with their roles
    async fn guild_members(&self) -> Result<Vec<GuildMember>, GatewayError>;

    /// Human-readable name for announcements.
    ///
    /// Defaults to a mention, which every platform client renders.
    async fn display_name(&self, member: &MemberId) -> Result<String, GatewayError> {
        Ok(format!("<@{}>", member))
    }
}
