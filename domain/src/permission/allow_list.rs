//! Allow-lists and the core permission check.

use crate::core::ids::{MemberId, RoleId};
use serde::{Deserialize, Serialize};

/// Members and roles allowed to take part in one kind of panic vote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowList {
    pub users: Vec<MemberId>,
    pub roles: Vec<RoleId>,
}

impl AllowList {
    pub fn new(users: Vec<MemberId>, roles: Vec<RoleId>) -> Self {
        Self { users, roles }
    }

    pub fn with_user(mut self, user: impl Into<MemberId>) -> Self {
        self.users.push(user.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<RoleId>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Whether nobody at all can pass this allow-list.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.roles.is_empty()
    }

    pub fn permits(&self, member: &MemberId, member_roles: &[RoleId]) -> bool {
        can_act(member, member_roles, &self.users, &self.roles)
    }
}

/// Decide whether a member passes an allow-list.
///
/// True iff the member id is listed, or at least one of the member's roles
/// is listed.
pub fn can_act(
    member: &MemberId,
    member_roles: &[RoleId],
    allowed_ids: &[MemberId],
    allowed_roles: &[RoleId],
) -> bool {
    allowed_ids.contains(member) || member_roles.iter().any(|r| allowed_roles.contains(r))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(ids: &[&str]) -> Vec<RoleId> {
        ids.iter().map(|r| RoleId::from(*r)).collect()
    }

    #[test]
    fn test_listed_member_can_act() {
        let allow = AllowList::default().with_user("alice");
        assert!(allow.permits(&MemberId::from("alice"), &[]));
        assert!(!allow.permits(&MemberId::from("bob"), &[]));
    }

    #[test]
    fn test_any_matching_role_is_enough() {
        let allow = AllowList::default().with_role("mod");
        // The matching role is not the last one held
        assert!(allow.permits(&MemberId::from("bob"), &roles(&["mod", "artist"])));
        assert!(allow.permits(&MemberId::from("bob"), &roles(&["artist", "mod"])));
        assert!(!allow.permits(&MemberId::from("bob"), &roles(&["artist"])));
    }

    #[test]
    fn test_empty_allow_list_denies_everyone() {
        let allow = AllowList::default();
        assert!(allow.is_empty());
        assert!(!allow.permits(&MemberId::from("alice"), &roles(&["mod"])));
    }

    #[test]
    fn test_can_act_free_function() {
        let member = MemberId::from("carol");
        assert!(can_act(&member, &[], &[member.clone()], &[]));
        assert!(can_act(&member, &roles(&["r1"]), &[], &roles(&["r1"])));
        assert!(!can_act(&member, &roles(&["r2"]), &[], &roles(&["r1"])));
    }
}
