//! Test doubles shared by the engine and handler tests.

use crate::ports::audit_log::{AuditEvent, AuditLog};
use crate::ports::messaging_gateway::{GatewayError, MessagingGateway, VotePrompt};
use crate::registry::MemberDirectory;
use async_trait::async_trait;
use panicbot_domain::{ChannelId, GuildMember, MemberId, RoleId};
use std::sync::Mutex;

/// Directory with moderators `mod0..mod3`, helpers `helper1..2`, an admin
/// and the usual troublemaker.
pub fn directory_with_mods() -> MemberDirectory {
    let mut members: Vec<_> = (0..4)
        .map(|i| GuildMember::new(format!("mod{}", i), vec![RoleId::from("mod")]))
        .collect();
    members.push(GuildMember::new("helper1", vec![RoleId::from("helper")]));
    members.push(GuildMember::new("helper2", vec![RoleId::from("helper")]));
    members.push(GuildMember::new("admin", vec![RoleId::from("admin")]));
    members.push(GuildMember::new("troll", vec![]));
    MemberDirectory::from_members(members)
}

#[derive(Default)]
pub struct MockMessaging {
    dms: Mutex<Vec<(MemberId, String)>>,
    prompts: Mutex<Vec<(MemberId, VotePrompt)>>,
    announcements: Mutex<Vec<String>>,
    bans: Mutex<Vec<(MemberId, String, u8)>>,
    ban_attempts: Mutex<usize>,
    fail_bans: bool,
}

impl MockMessaging {
    pub fn failing_bans() -> Self {
        Self {
            fail_bans: true,
            ..Default::default()
        }
    }

    pub fn dms(&self) -> Vec<(MemberId, String)> {
        self.dms.lock().unwrap().clone()
    }

    pub fn prompted(&self) -> Vec<MemberId> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .map(|(m, _)| m.clone())
            .collect()
    }

    pub fn announcements(&self) -> Vec<String> {
        self.announcements.lock().unwrap().clone()
    }

    pub fn last_announcement(&self) -> Option<String> {
        self.announcements.lock().unwrap().last().cloned()
    }

    pub fn bans(&self) -> Vec<(MemberId, String, u8)> {
        self.bans.lock().unwrap().clone()
    }

    pub fn ban_attempts(&self) -> usize {
        *self.ban_attempts.lock().unwrap()
    }
}

#[async_trait]
impl MessagingGateway for MockMessaging {
    async fn send_dm(&self, member: &MemberId, text: &str) -> Result<(), GatewayError> {
        self.dms
            .lock()
            .unwrap()
            .push((member.clone(), text.to_string()));
        Ok(())
    }

    async fn send_vote_prompt(
        &self,
        member: &MemberId,
        prompt: &VotePrompt,
    ) -> Result<(), GatewayError> {
        self.prompts
            .lock()
            .unwrap()
            .push((member.clone(), prompt.clone()));
        Ok(())
    }

    async fn send_channel_message(
        &self,
        _channel: Option<&ChannelId>,
        text: &str,
    ) -> Result<(), GatewayError> {
        self.announcements.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn ban_member(
        &self,
        member: &MemberId,
        reason: &str,
        purge_days: u8,
    ) -> Result<(), GatewayError> {
        *self.ban_attempts.lock().unwrap() += 1;
        if self.fail_bans {
            return Err(GatewayError::PermissionDenied("BAN_MEMBERS".to_string()));
        }
        self.bans
            .lock()
            .unwrap()
            .push((member.clone(), reason.to_string(), purge_days));
        Ok(())
    }

    async fn guild_members(&self) -> Result<Vec<GuildMember>, GatewayError> {
        Ok(directory_with_mods().members())
    }
}

#[derive(Default)]
pub struct RecordingAudit {
    events: Mutex<Vec<&'static str>>,
}

impl RecordingAudit {
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditLog for RecordingAudit {
    fn record(&self, event: AuditEvent) {
        self.events.lock().unwrap().push(event.event_type);
    }
}
