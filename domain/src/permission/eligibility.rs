//! Eligibility policy: allow-lists combined with grace-period carry-over.
//!
//! ```text
//!   eligible(kind, stage) = allow_list[kind].permits(member, roles)
//!                         || (grace[kind] covers stage && member in grace)
//! ```

use super::allow_list::AllowList;
use crate::core::ids::{MemberId, RoleId};
use crate::vote::entities::VoteKind;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which step of a vote an eligibility check is made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteStage {
    /// Starting a vote via a command.
    Trigger,
    /// Casting a ballot on an outstanding vote.
    Cast,
}

/// Where a live grace entry substitutes for the allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraceScope {
    /// Grace never applies.
    #[default]
    None,
    /// Grace applies when starting a vote.
    Trigger,
    /// Grace applies when casting a ballot.
    Cast,
    /// Grace applies to both.
    Both,
}

impl GraceScope {
    pub fn covers(&self, stage: VoteStage) -> bool {
        match self {
            GraceScope::None => false,
            GraceScope::Trigger => stage == VoteStage::Trigger,
            GraceScope::Cast => stage == VoteStage::Cast,
            GraceScope::Both => true,
        }
    }
}

impl FromStr for GraceScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" | "off" => Ok(GraceScope::None),
            "trigger" => Ok(GraceScope::Trigger),
            "cast" => Ok(GraceScope::Cast),
            "both" | "all" => Ok(GraceScope::Both),
            other => Err(format!(
                "Unknown grace scope: {}. Valid: none, trigger, cast, both",
                other
            )),
        }
    }
}

/// Grace-period carry-over per panic kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GracePolicy {
    pub alert: GraceScope,
    pub ban: GraceScope,
}

impl Default for GracePolicy {
    /// Alerts honor grace everywhere; bans use the allow-list only.
    fn default() -> Self {
        Self {
            alert: GraceScope::Both,
            ban: GraceScope::None,
        }
    }
}

impl GracePolicy {
    pub fn scope(&self, kind: VoteKind) -> GraceScope {
        match kind {
            VoteKind::Alert => self.alert,
            VoteKind::Ban => self.ban,
        }
    }
}

/// Complete eligibility rules for both panic kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibilityPolicy {
    pub alert: AllowList,
    pub ban: AllowList,
    pub grace: GracePolicy,
}

impl EligibilityPolicy {
    pub fn new(alert: AllowList, ban: AllowList) -> Self {
        Self {
            alert,
            ban,
            grace: GracePolicy::default(),
        }
    }

    pub fn with_grace(mut self, grace: GracePolicy) -> Self {
        self.grace = grace;
        self
    }

    pub fn allow_list(&self, kind: VoteKind) -> &AllowList {
        match kind {
            VoteKind::Alert => &self.alert,
            VoteKind::Ban => &self.ban,
        }
    }

    /// Decide whether `member` may act on a vote of `kind` at `stage`.
    ///
    /// `in_grace` is whether the member currently holds a live grace entry.
    pub fn is_eligible(
        &self,
        kind: VoteKind,
        stage: VoteStage,
        member: &MemberId,
        member_roles: &[RoleId],
        in_grace: bool,
    ) -> bool {
        if self.allow_list(kind).permits(member, member_roles) {
            return true;
        }
        in_grace && self.grace.scope(kind).covers(stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> EligibilityPolicy {
        EligibilityPolicy::new(
            AllowList::default().with_role("helper"),
            AllowList::default().with_role("mod").with_user("owner"),
        )
    }

    fn id(s: &str) -> MemberId {
        MemberId::from(s)
    }

    #[test]
    fn test_allow_listed_member_is_eligible_everywhere() {
        let p = policy();
        let roles = vec![RoleId::from("mod")];
        assert!(p.is_eligible(VoteKind::Ban, VoteStage::Trigger, &id("m"), &roles, false));
        assert!(p.is_eligible(VoteKind::Ban, VoteStage::Cast, &id("m"), &roles, false));
        assert!(p.is_eligible(VoteKind::Ban, VoteStage::Cast, &id("owner"), &[], false));
    }

    #[test]
    fn test_default_grace_applies_to_alerts_only() {
        let p = policy();
        assert!(p.is_eligible(VoteKind::Alert, VoteStage::Trigger, &id("x"), &[], true));
        assert!(p.is_eligible(VoteKind::Alert, VoteStage::Cast, &id("x"), &[], true));
        assert!(!p.is_eligible(VoteKind::Ban, VoteStage::Trigger, &id("x"), &[], true));
        assert!(!p.is_eligible(VoteKind::Ban, VoteStage::Cast, &id("x"), &[], true));
    }

    #[test]
    fn test_no_grace_entry_no_carry_over() {
        let p = policy();
        assert!(!p.is_eligible(VoteKind::Alert, VoteStage::Trigger, &id("x"), &[], false));
    }

    #[test]
    fn test_ban_grace_trigger_only_policy() {
        let p = policy().with_grace(GracePolicy {
            alert: GraceScope::Both,
            ban: GraceScope::Trigger,
        });
        assert!(p.is_eligible(VoteKind::Ban, VoteStage::Trigger, &id("x"), &[], true));
        assert!(!p.is_eligible(VoteKind::Ban, VoteStage::Cast, &id("x"), &[], true));
    }

    #[test]
    fn test_ban_grace_cast_only_policy() {
        let p = policy().with_grace(GracePolicy {
            alert: GraceScope::None,
            ban: GraceScope::Cast,
        });
        assert!(!p.is_eligible(VoteKind::Ban, VoteStage::Trigger, &id("x"), &[], true));
        assert!(p.is_eligible(VoteKind::Ban, VoteStage::Cast, &id("x"), &[], true));
        assert!(!p.is_eligible(VoteKind::Alert, VoteStage::Cast, &id("x"), &[], true));
    }

    #[test]
    fn test_parse_grace_scope() {
        assert_eq!("both".parse::<GraceScope>().ok(), Some(GraceScope::Both));
        assert_eq!("Trigger".parse::<GraceScope>().ok(), Some(GraceScope::Trigger));
        assert_eq!("".parse::<GraceScope>().ok(), Some(GraceScope::None));
        assert!("sometimes".parse::<GraceScope>().is_err());
    }
}
