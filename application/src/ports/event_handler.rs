//! Inbound event port.
//!
//! The platform adapter translates raw gateway events (slash commands,
//! button clicks, member updates) into calls on [`PanicEventHandler`] and
//! delivers the returned [`Reply`] as the interaction response.
//!
//! ```text
//! platform event ──▶ adapter ──▶ PanicEventHandler ──▶ Reply ──▶ adapter
//! ```

use async_trait::async_trait;
use panicbot_domain::{Actor, MemberId, RoleId};

/// Response to an inbound interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    /// Visible only to the member who triggered the interaction.
    pub ephemeral: bool,
}

impl Reply {
    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
        }
    }

    pub fn private(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
        }
    }
}

/// One method per inbound event kind.
#[async_trait]
pub trait PanicEventHandler: Send + Sync {
    /// `/panicalert <message>`
    async fn on_panic_alert(&self, actor: &Actor, message: &str) -> Reply;

    /// `/panicban <user> <reason> [days]`
    async fn on_panic_ban(
        &self,
        actor: &Actor,
        target: &MemberId,
        reason: &str,
        days: Option<i64>,
    ) -> Reply;

    /// A cast-vote button was pressed; `token` is the prompt's correlation token.
    async fn on_vote_button(&self, member: &MemberId, token: &str) -> Reply;

    /// A member's roles changed.
    async fn on_role_change(&self, member: &MemberId, added: &[RoleId], removed: &[RoleId]);
}
