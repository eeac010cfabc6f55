//! Voting policy: everything the lifecycle engine reads from configuration.
//!
//! [`VotingPolicy`] is the resolved, typed form of the `voting` and
//! `gracePeriod` configuration sections. It is read-only once the engine is
//! built.

use panicbot_domain::vote::DEFAULT_GRACE_WINDOW;
use panicbot_domain::{
    AllowList, ChannelId, EligibilityPolicy, GracePolicy, MemberId, RequiredVotes, RoleId,
    VoteTimers,
};
use std::time::Duration;

/// Who gets told when an alert passes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactList {
    pub discord_users: Vec<MemberId>,
    pub discord_roles: Vec<RoleId>,
    pub phone_numbers: Vec<String>,
    pub email_addresses: Vec<String>,
}

impl ContactList {
    pub fn is_empty(&self) -> bool {
        self.discord_users.is_empty()
            && self.discord_roles.is_empty()
            && self.phone_numbers.is_empty()
            && self.email_addresses.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotingPolicy {
    pub eligibility: EligibilityPolicy,
    pub required_votes: RequiredVotes,
    pub vote_timers: VoteTimers,
    /// How long a revoked qualifying role keeps counting.
    pub grace_window: Duration,
    /// Roles whose removal opens a grace period.
    pub grace_roles: Vec<RoleId>,
    pub contacts: ContactList,
    /// Channel for announcements; `None` lets the gateway pick its default.
    pub primary_channel: Option<ChannelId>,
}

impl Default for VotingPolicy {
    fn default() -> Self {
        Self {
            eligibility: EligibilityPolicy::default(),
            required_votes: RequiredVotes::default(),
            vote_timers: VoteTimers::default(),
            grace_window: DEFAULT_GRACE_WINDOW,
            grace_roles: Vec::new(),
            contacts: ContactList::default(),
            primary_channel: None,
        }
    }
}

impl VotingPolicy {
    /// Build a policy from allow-lists. The ban allow-list's roles double as
    /// the grace-qualifying roles.
    pub fn new(alert: AllowList, ban: AllowList) -> Self {
        let grace_roles = ban.roles.clone();
        Self {
            eligibility: EligibilityPolicy::new(alert, ban),
            grace_roles,
            ..Default::default()
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_required_votes(mut self, required: RequiredVotes) -> Self {
        self.required_votes = required;
        self
    }

    pub fn with_vote_timers(mut self, timers: VoteTimers) -> Self {
        self.vote_timers = timers;
        self
    }

    pub fn with_grace_policy(mut self, grace: GracePolicy) -> Self {
        self.eligibility.grace = grace;
        self
    }

    pub fn with_grace_window(mut self, window: Duration) -> Self {
        self.grace_window = window;
        self
    }

    pub fn with_grace_roles(mut self, roles: Vec<RoleId>) -> Self {
        self.grace_roles = roles;
        self
    }

    pub fn with_contacts(mut self, contacts: ContactList) -> Self {
        self.contacts = contacts;
        self
    }

    pub fn with_primary_channel(mut self, channel: Option<ChannelId>) -> Self {
        self.primary_channel = channel;
        self
    }
}
