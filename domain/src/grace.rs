//! Grace-period entries.
//!
//! When a member loses a voting-qualifying role they keep eligibility for a
//! bounded window. The revocation timestamp is the entry's identity: the
//! delayed removal scheduled for one revocation carries that timestamp as a
//! fencing token and must not delete an entry written by a later one.

use crate::core::ids::{MemberId, RoleId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One member's eligibility carry-over after a role revocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraceEntry {
    pub member: MemberId,
    pub role: RoleId,
    pub revoked_at: DateTime<Utc>,
}

impl GraceEntry {
    pub fn new(member: MemberId, role: RoleId, revoked_at: DateTime<Utc>) -> Self {
        Self {
            member,
            role,
            revoked_at,
        }
    }

    /// The fencing token handed to the scheduled removal.
    pub fn token(&self) -> DateTime<Utc> {
        self.revoked_at
    }

    /// Whether a removal carrying `token` may delete this entry.
    pub fn matches(&self, token: DateTime<Utc>) -> bool {
        self.revoked_at == token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn test_token_matches_only_its_own_revocation() {
        let first = Utc::now();
        let entry = GraceEntry::new(MemberId::from("m"), RoleId::from("mod"), first);
        assert!(entry.matches(entry.token()));
        assert!(!entry.matches(first + TimeDelta::seconds(1)));
    }
}
