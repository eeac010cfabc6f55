//! Raw configuration data types
//!
//! These structs mirror the config file (YAML or TOML, camelCase keys).
//! They are deserialized directly and converted into application types by
//! [`FileConfig::to_voting_policy`].

mod alerting;
mod duration;
mod grace;
mod voting;

pub use alerting::{FileAlertingMethods, FileEmailAuth, FileEmailConfig, FileTwilioConfig};
pub use duration::{FileDuration, resolve_duration};
pub use grace::FileGracePeriodConfig;
pub use voting::{
    FileAddressList, FileContactOnVote, FileIdList, FilePerKind, FilePhoneList, FileRateWindow,
    FileVoteTimers, FileVotingConfig,
};

use panicbot_application::VotingPolicy;
use panicbot_domain::{ChannelId, ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileConfig {
    pub discord_bot_token: String,
    #[serde(rename = "guildID", alias = "guildId")]
    pub guild_id: String,
    /// Announcement channel; discovered from the guild when empty
    #[serde(rename = "primaryChannelID", alias = "primaryChannelId")]
    pub primary_channel_id: String,
    pub alerting_methods: FileAlertingMethods,
    pub voting: FileVotingConfig,
    pub grace_period: FileGracePeriodConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Discord credentials are checked by the Discord adapter itself, since
    /// the console gateway runs without them.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Voting: timers, allow-lists, unenforced sections
        issues.extend(self.voting.validate());

        // 2. Grace period
        issues.extend(self.grace_period.to_window().1);
        issues.extend(self.grace_period.to_grace_policy().1);

        // 3. Alerting providers
        issues.extend(self.alerting_methods.twilio.validate());

        let contacts = &self.voting.contact_on_vote;
        if !contacts.twilio.phone_numbers.is_empty()
            && !self.alerting_methods.twilio.is_configured()
        {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::MissingField {
                    field: "alertingMethods.twilio".to_string(),
                },
                "voting.contactOnVote.twilio lists phone numbers but Twilio is not configured; SMS alerts will be skipped",
            ));
        }

        if !contacts.email.addresses.is_empty()
            || self.alerting_methods.email != FileEmailConfig::default()
        {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::UnenforcedSection {
                    section: "alertingMethods.email".to_string(),
                },
                "email alerting is configured but not implemented; addresses will only be logged",
            ));
        }

        issues
    }

    /// Discord credential issues (only relevant for the Discord gateway).
    pub fn validate_discord(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for (field, value) in [
            ("discordBotToken", &self.discord_bot_token),
            ("guildID", &self.guild_id),
        ] {
            if value.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::MissingField {
                        field: field.to_string(),
                    },
                    format!(
                        "{} cannot be empty. Did you forget to set it in the config?",
                        field
                    ),
                ));
            }
        }
        issues
    }

    pub fn primary_channel(&self) -> Option<ChannelId> {
        let id = self.primary_channel_id.trim();
        (!id.is_empty()).then(|| ChannelId::new(id))
    }

    /// Resolve the typed voting policy.
    ///
    /// Invalid values have already fallen back to defaults; the issues
    /// describing them are the same ones [`validate`](Self::validate) reports.
    pub fn to_voting_policy(&self) -> VotingPolicy {
        let voting = &self.voting;
        let mut policy = VotingPolicy::new(
            voting.allowed_to_vote.panic_alert.to_allow_list(),
            voting.allowed_to_vote.panic_ban.to_allow_list(),
        )
        .with_required_votes(voting.to_required_votes())
        .with_vote_timers(voting.vote_timers.to_vote_timers().0)
        .with_grace_policy(self.grace_period.to_grace_policy().0)
        .with_grace_window(self.grace_period.to_window().0)
        .with_contacts(voting.contact_on_vote.to_contact_list())
        .with_primary_channel(self.primary_channel());

        if let Some(roles) = self.grace_period.to_roles() {
            policy = policy.with_grace_roles(roles);
        }
        policy
    }

    /// Render as TOML (for `--show-config`). Secrets are masked.
    pub fn to_display_toml(&self) -> Result<String, toml::ser::Error> {
        let mut shown = self.clone();
        mask(&mut shown.discord_bot_token);
        mask(&mut shown.alerting_methods.twilio.api_secret);
        mask(&mut shown.alerting_methods.twilio.auth_token);
        mask(&mut shown.alerting_methods.email.auth.password);
        toml::to_string_pretty(&shown)
    }
}

fn mask(secret: &mut String) {
    if !secret.is_empty() {
        *secret = "********".to_string();
    }
}
