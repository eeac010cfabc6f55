//! Voting configuration (`voting` section)

use super::duration::{FileDuration, resolve_duration};
use panicbot_application::ContactList;
use panicbot_domain::vote::DEFAULT_VOTE_TIMER;
use panicbot_domain::{
    AllowList, ConfigIssue, ConfigIssueCode, MemberId, RequiredVotes, RoleId, VoteTimers,
};
use serde::{Deserialize, Serialize};

/// Member and role ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileIdList {
    pub users: Vec<String>,
    pub roles: Vec<String>,
}

impl FileIdList {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.roles.is_empty()
    }

    pub fn to_allow_list(&self) -> AllowList {
        AllowList::new(
            non_blank(&self.users).map(MemberId::new).collect(),
            non_blank(&self.roles).map(RoleId::new).collect(),
        )
    }
}

fn non_blank(ids: &[String]) -> impl Iterator<Item = String> + '_ {
    ids.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Per-kind pair, used by several subsections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilePerKind<T> {
    pub panic_alert: T,
    pub panic_ban: T,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileVoteTimers {
    pub panic_alert_vote_timer: Option<FileDuration>,
    pub panic_ban_vote_timer: Option<FileDuration>,
}

impl FileVoteTimers {
    pub fn to_vote_timers(&self) -> (VoteTimers, Vec<ConfigIssue>) {
        let (panic_alert, mut issues) = resolve_duration(
            "voting.voteTimers.panicAlertVoteTimer",
            self.panic_alert_vote_timer.as_ref(),
            DEFAULT_VOTE_TIMER,
        );
        let (panic_ban, ban_issues) = resolve_duration(
            "voting.voteTimers.panicBanVoteTimer",
            self.panic_ban_vote_timer.as_ref(),
            DEFAULT_VOTE_TIMER,
        );
        issues.extend(ban_issues);
        (
            VoteTimers {
                panic_alert,
                panic_ban,
            },
            issues,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRateWindow {
    pub day: u32,
    pub hour: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePhoneList {
    #[serde(rename = "phoneNumbers")]
    pub phone_numbers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAddressList {
    pub addresses: Vec<String>,
}

/// Who is told when an alert passes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileContactOnVote {
    pub discord: FileIdList,
    pub twilio: FilePhoneList,
    pub email: FileAddressList,
}

impl FileContactOnVote {
    pub fn to_contact_list(&self) -> ContactList {
        ContactList {
            discord_users: non_blank(&self.discord.users).map(MemberId::new).collect(),
            discord_roles: non_blank(&self.discord.roles).map(RoleId::new).collect(),
            phone_numbers: non_blank(&self.twilio.phone_numbers).collect(),
            email_addresses: non_blank(&self.email.addresses).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileVotingConfig {
    pub contact_on_vote: FileContactOnVote,
    pub required_votes: FilePerKind<usize>,
    pub allowed_to_vote: FilePerKind<FileIdList>,
    pub vote_timers: FileVoteTimers,
    /// Parsed but not enforced
    pub cooldown: FilePerKind<Option<FileDuration>>,
    /// Parsed but not enforced
    pub rate_limit: FilePerKind<FileRateWindow>,
}

impl FileVotingConfig {
    pub fn to_required_votes(&self) -> RequiredVotes {
        RequiredVotes::new(self.required_votes.panic_alert, self.required_votes.panic_ban)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.vote_timers.to_vote_timers().1;

        for (kind, list) in [
            ("panicAlert", &self.allowed_to_vote.panic_alert),
            ("panicBan", &self.allowed_to_vote.panic_ban),
        ] {
            if list.to_allow_list().is_empty() {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::NobodyCanVote {
                        kind: kind.to_string(),
                    },
                    format!(
                        "voting.allowedToVote.{}: no users or roles listed, nobody can use this command",
                        kind
                    ),
                ));
            }
        }

        if self.cooldown != FilePerKind::default() {
            issues.push(unenforced("voting.cooldown"));
        }
        if self.rate_limit != FilePerKind::default() {
            issues.push(unenforced("voting.rateLimit"));
        }

        issues
    }
}

fn unenforced(section: &str) -> ConfigIssue {
    ConfigIssue::warning(
        ConfigIssueCode::UnenforcedSection {
            section: section.to_string(),
        },
        format!("{} is configured but not enforced", section),
    )
}
