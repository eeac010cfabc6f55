//! Messaging gateway that renders to the terminal
//!
//! Keeps an in-memory guild roster so the engine can enumerate voters and
//! resolve roles exactly as it would against Discord.

use async_trait::async_trait;
use colored::Colorize;
use panicbot_application::{GatewayError, MessagingGateway, VotePrompt};
use panicbot_domain::{ChannelId, GuildMember, MemberId, RoleId};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, RwLock};
use tracing::info;

pub struct ConsoleMessagingGateway {
    roster: RwLock<BTreeMap<MemberId, Vec<RoleId>>>,
    /// Latest prompt token delivered to each member
    prompts: Mutex<HashMap<MemberId, String>>,
    primary_channel: String,
    quiet: bool,
}

impl ConsoleMessagingGateway {
    pub fn new(members: Vec<GuildMember>) -> Self {
        Self {
            roster: RwLock::new(members.into_iter().map(|m| (m.id, m.roles)).collect()),
            prompts: Mutex::new(HashMap::new()),
            primary_channel: "general".to_string(),
            quiet: false,
        }
    }

    /// Name shown for messages addressed to the primary channel
    pub fn with_primary_channel(mut self, channel: Option<&ChannelId>) -> Self {
        if let Some(channel) = channel {
            self.primary_channel = channel.to_string();
        }
        self
    }

    /// Suppress terminal output (tests)
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn roles_of(&self, member: &MemberId) -> Vec<RoleId> {
        self.roster
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(member)
            .cloned()
            .unwrap_or_default()
    }

    pub fn contains(&self, member: &MemberId) -> bool {
        self.roster
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(member)
    }

    /// Apply a role change, adding the member if unknown.
    ///
    /// Returns the roles actually added and removed, which is what the
    /// platform would report as a member update.
    pub fn update_roles(
        &self,
        member: &MemberId,
        added: &[RoleId],
        removed: &[RoleId],
    ) -> (Vec<RoleId>, Vec<RoleId>) {
        let mut roster = self.roster.write().unwrap_or_else(|e| e.into_inner());
        let roles = roster.entry(member.clone()).or_default();

        let mut actually_added = Vec::new();
        for role in added {
            if !roles.contains(role) {
                roles.push(role.clone());
                actually_added.push(role.clone());
            }
        }
        let mut actually_removed = Vec::new();
        roles.retain(|role| {
            let drop = removed.contains(role);
            if drop {
                actually_removed.push(role.clone());
            }
            !drop
        });

        (actually_added, actually_removed)
    }

    pub fn latest_prompt(&self, member: &MemberId) -> Option<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(member)
            .cloned()
    }

    fn print(&self, text: String) {
        if !self.quiet {
            println!("{}", text);
        }
    }
}

pub(crate) fn render_dm(member: &MemberId, text: &str) -> String {
    format!("{} {}", format!("[DM → {}]", member).magenta().bold(), text)
}

pub(crate) fn render_prompt(member: &MemberId, prompt: &VotePrompt) -> String {
    let mut out = format!("{} {}\n", format!("[DM → {}]", member).magenta().bold(), prompt.content);
    out.push_str(&format!("  {}\n", prompt.title.red().bold()));
    for line in prompt.description.lines() {
        out.push_str(&format!("  {}\n", line));
    }
    out.push_str(&format!(
        "  {} {}",
        format!("[🔨 {}]", prompt.button_label).red(),
        format!("/vote {}", prompt.token).dimmed()
    ));
    out
}

pub(crate) fn render_channel(channel: &str, text: &str) -> String {
    format!("{} {}", format!("[#{}]", channel).cyan().bold(), text)
}

#[async_trait]
impl MessagingGateway for ConsoleMessagingGateway {
    async fn send_dm(&self, member: &MemberId, text: &str) -> Result<(), GatewayError> {
        self.print(render_dm(member, text));
        Ok(())
    }

    async fn send_vote_prompt(
        &self,
        member: &MemberId,
        prompt: &VotePrompt,
    ) -> Result<(), GatewayError> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(member.clone(), prompt.token.clone());
        self.print(render_prompt(member, prompt));
        Ok(())
    }

    async fn send_channel_message(
        &self,
        channel: Option<&ChannelId>,
        text: &str,
    ) -> Result<(), GatewayError> {
        let name = channel
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .unwrap_or_else(|| self.primary_channel.clone());
        self.print(render_channel(&name, text));
        Ok(())
    }

    async fn ban_member(
        &self,
        member: &MemberId,
        reason: &str,
        purge_days: u8,
    ) -> Result<(), GatewayError> {
        let removed = self
            .roster
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(member);
        if removed.is_none() {
            return Err(GatewayError::NotFound(format!("member {}", member)));
        }

        info!(member = %member, purge_days, "Console ban");
        self.print(format!(
            "{} {} (reason: {}, purge {} day(s))",
            "[BAN]".red().bold(),
            member,
            reason,
            purge_days
        ));
        Ok(())
    }

    async fn guild_members(&self) -> Result<Vec<GuildMember>, GatewayError> {
        Ok(self
            .roster
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(id, roles)| GuildMember::new(id.clone(), roles.clone()))
            .collect())
    }

    async fn display_name(&self, member: &MemberId) -> Result<String, GatewayError> {
        if self.contains(member) {
            Ok(format!("@{}", member))
        } else {
            Err(GatewayError::NotFound(format!("member {}", member)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> ConsoleMessagingGateway {
        ConsoleMessagingGateway::new(vec![
            GuildMember::new("mod0", vec![RoleId::from("mod")]),
            GuildMember::new("troll", vec![]),
        ])
        .quiet()
    }

    #[test]
    fn test_update_roles_reports_effective_changes() {
        let gateway = gateway();
        let member = MemberId::from("mod0");

        let (added, removed) = gateway.update_roles(
            &member,
            &[RoleId::from("mod"), RoleId::from("helper")],
            &[RoleId::from("admin")],
        );
        assert_eq!(added, vec![RoleId::from("helper")]);
        assert!(removed.is_empty());

        let (added, removed) = gateway.update_roles(&member, &[], &[RoleId::from("mod")]);
        assert!(added.is_empty());
        assert_eq!(removed, vec![RoleId::from("mod")]);
        assert_eq!(gateway.roles_of(&member), vec![RoleId::from("helper")]);
    }

    #[test]
    fn test_update_roles_adds_unknown_member() {
        let gateway = gateway();
        let newcomer = MemberId::from("newcomer");
        gateway.update_roles(&newcomer, &[RoleId::from("mod")], &[]);
        assert!(gateway.contains(&newcomer));
    }

    #[tokio::test]
    async fn test_prompt_token_is_remembered() {
        let gateway = gateway();
        let member = MemberId::from("mod0");
        let prompt = VotePrompt {
            content: "vote".to_string(),
            title: "Ban troll?".to_string(),
            description: "Reason: spam".to_string(),
            button_label: "Vote to ban".to_string(),
            token: "tok-1".to_string(),
        };
        gateway.send_vote_prompt(&member, &prompt).await.unwrap();
        assert_eq!(gateway.latest_prompt(&member), Some("tok-1".to_string()));
        assert_eq!(gateway.latest_prompt(&MemberId::from("troll")), None);

        let rendered = render_prompt(&member, &prompt);
        assert!(rendered.contains("Ban troll?"));
        assert!(rendered.contains("tok-1"));
    }

    #[tokio::test]
    async fn test_ban_removes_member_from_roster() {
        let gateway = gateway();
        let troll = MemberId::from("troll");
        gateway.ban_member(&troll, "spam", 1).await.unwrap();
        assert!(!gateway.contains(&troll));
        assert_eq!(gateway.guild_members().await.unwrap().len(), 1);

        let err = gateway.ban_member(&troll, "spam", 1).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_display_name_for_unknown_member_fails() {
        let gateway = gateway();
        assert_eq!(
            gateway.display_name(&MemberId::from("mod0")).await.unwrap(),
            "@mod0"
        );
        assert!(gateway.display_name(&MemberId::from("ghost")).await.is_err());
    }
}
