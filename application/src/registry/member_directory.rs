//! Last-known roles of every guild member.
//!
//! Button clicks arrive in DMs without role information, so the engine
//! resolves a caster's roles here. The directory is filled from the
//! gateway's member enumeration, refreshed periodically, and patched on
//! every role-change event in between.

use crate::ports::messaging_gateway::{GatewayError, MessagingGateway};
use crate::scheduler::{SchedulerError, Ticker, ticker};
use panicbot_domain::{GuildMember, MemberId, RoleId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{error, info};

/// How often the directory is reloaded from the platform.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);

#[derive(Default)]
pub struct MemberDirectory {
    members: RwLock<HashMap<MemberId, Vec<RoleId>>>,
}

impl MemberDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_members(members: Vec<GuildMember>) -> Self {
        let directory = Self::new();
        directory.replace_all(members);
        directory
    }

    /// Swap in a freshly enumerated member list.
    pub fn replace_all(&self, members: Vec<GuildMember>) {
        let fresh: HashMap<_, _> = members.into_iter().map(|m| (m.id, m.roles)).collect();
        *self.members.write().unwrap_or_else(|e| e.into_inner()) = fresh;
    }

    /// Roles of `member`, empty when unknown.
    pub fn roles_of(&self, member: &MemberId) -> Vec<RoleId> {
        let members = self.members.read().unwrap_or_else(|e| e.into_inner());
        members.get(member).cloned().unwrap_or_default()
    }

    pub fn contains(&self, member: &MemberId) -> bool {
        let members = self.members.read().unwrap_or_else(|e| e.into_inner());
        members.contains_key(member)
    }

    pub fn apply_role_change(&self, member: &MemberId, added: &[RoleId], removed: &[RoleId]) {
        let mut members = self.members.write().unwrap_or_else(|e| e.into_inner());
        let roles = members.entry(member.clone()).or_default();
        roles.retain(|role| !removed.contains(role));
        for role in added {
            if !roles.contains(role) {
                roles.push(role.clone());
            }
        }
    }

    /// All members, sorted by id.
    pub fn members(&self) -> Vec<GuildMember> {
        let members = self.members.read().unwrap_or_else(|e| e.into_inner());
        let mut out: Vec<_> = members
            .iter()
            .map(|(id, roles)| GuildMember::new(id.clone(), roles.clone()))
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    pub fn members_with_role(&self, role: &RoleId) -> Vec<MemberId> {
        let members = self.members.read().unwrap_or_else(|e| e.into_inner());
        let mut out: Vec<_> = members
            .iter()
            .filter(|(_, roles)| roles.contains(role))
            .map(|(id, _)| id.clone())
            .collect();
        out.sort();
        out
    }

    pub fn len(&self) -> usize {
        self.members.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reload from the platform. On failure the previous contents stay.
    pub async fn refresh(&self, gateway: &dyn MessagingGateway) -> Result<usize, GatewayError> {
        let members = gateway.guild_members().await?;
        let count = members.len();
        self.replace_all(members);
        info!(members = count, "Member directory refreshed");
        Ok(count)
    }

    /// Refresh every `period` until the returned ticker is dropped.
    pub fn spawn_refresh(
        self: &Arc<Self>,
        gateway: Arc<dyn MessagingGateway>,
        period: Duration,
    ) -> Result<Ticker, SchedulerError> {
        let directory = Arc::clone(self);
        ticker(period, move || {
            let directory = Arc::clone(&directory);
            let gateway = Arc::clone(&gateway);
            async move {
                if let Err(e) = directory.refresh(gateway.as_ref()).await {
                    error!("Failed to refresh member directory: {}", e);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::messaging_gateway::VotePrompt;
    use async_trait::async_trait;
    use panicbot_domain::ChannelId;
    use std::sync::Mutex;

    fn roles(names: &[&str]) -> Vec<RoleId> {
        names.iter().map(|r| RoleId::from(*r)).collect()
    }

    struct RosterGateway {
        roster: Mutex<Vec<GuildMember>>,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl MessagingGateway for RosterGateway {
        async fn send_dm(&self, _: &MemberId, _: &str) -> Result<(), GatewayError> {
            Ok(())
        }
        async fn send_vote_prompt(&self, _: &MemberId, _: &VotePrompt) -> Result<(), GatewayError> {
            Ok(())
        }
        async fn send_channel_message(
            &self,
            _: Option<&ChannelId>,
            _: &str,
        ) -> Result<(), GatewayError> {
            Ok(())
        }
        async fn ban_member(&self, _: &MemberId, _: &str, _: u8) -> Result<(), GatewayError> {
            Ok(())
        }
        async fn guild_members(&self) -> Result<Vec<GuildMember>, GatewayError> {
            *self.calls.lock().unwrap() += 1;
            Ok(self.roster.lock().unwrap().clone())
        }
    }

    #[test]
    fn test_role_change_patches_entry() {
        let directory =
            MemberDirectory::from_members(vec![GuildMember::new("alice", roles(&["mod", "artist"]))]);
        let alice = MemberId::from("alice");

        directory.apply_role_change(&alice, &roles(&["helper", "artist"]), &roles(&["mod"]));
        assert_eq!(directory.roles_of(&alice), roles(&["artist", "helper"]));
        assert!(directory.members_with_role(&RoleId::from("mod")).is_empty());
        assert_eq!(directory.members_with_role(&RoleId::from("helper")), vec![alice]);
    }

    #[test]
    fn test_unknown_member_has_no_roles() {
        let directory = MemberDirectory::new();
        assert!(directory.roles_of(&MemberId::from("ghost")).is_empty());
        assert!(directory.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodic_refresh_picks_up_new_members() {
        let gateway = Arc::new(RosterGateway {
            roster: Mutex::new(vec![GuildMember::new("alice", roles(&["mod"]))]),
            calls: Mutex::new(0),
        });
        let directory = Arc::new(MemberDirectory::new());
        directory.refresh(gateway.as_ref()).await.unwrap();
        assert_eq!(directory.len(), 1);

        let _ticker = directory
            .spawn_refresh(gateway.clone(), Duration::from_secs(60))
            .unwrap();
        gateway
            .roster
            .lock()
            .unwrap()
            .push(GuildMember::new("bob", roles(&["mod"])));

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(*gateway.calls.lock().unwrap(), 2);
        assert_eq!(directory.members_with_role(&RoleId::from("mod")).len(), 2);
    }
}
