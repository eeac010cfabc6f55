//! Guild members as seen by the bot.

use crate::core::ids::{MemberId, RoleId};
use serde::{Deserialize, Serialize};

/// A guild member and the roles they currently hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildMember {
    pub id: MemberId,
    pub roles: Vec<RoleId>,
}

impl GuildMember {
    pub fn new(id: impl Into<MemberId>, roles: Vec<RoleId>) -> Self {
        Self {
            id: id.into(),
            roles,
        }
    }

    pub fn has_role(&self, role: &RoleId) -> bool {
        self.roles.contains(role)
    }
}

/// The member who issued a command, with the roles attached to the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: MemberId,
    pub roles: Vec<RoleId>,
}

impl Actor {
    pub fn new(id: impl Into<MemberId>, roles: Vec<RoleId>) -> Self {
        Self {
            id: id.into(),
            roles,
        }
    }
}

impl From<GuildMember> for Actor {
    fn from(member: GuildMember) -> Self {
        Self {
            id: member.id,
            roles: member.roles,
        }
    }
}
