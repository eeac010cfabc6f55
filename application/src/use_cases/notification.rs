//! Notification Dispatcher.
//!
//! Delivers vote prompts, administrator alerts and channel announcements
//! through the outbound gateways. Deliveries fan out concurrently; a failed
//! delivery is logged and counted, never propagated.

use crate::config::ContactList;
use crate::ports::email_gateway::EmailGateway;
use crate::ports::messaging_gateway::{MessagingGateway, VotePrompt};
use crate::ports::telephony_gateway::TelephonyGateway;
use crate::registry::MemberDirectory;
use futures::future::join_all;
use panicbot_domain::core::string::{
    EMBED_DESCRIPTION_MAX_LEN, SMS_MAX_LEN, single_line, truncate,
};
use panicbot_domain::{ChannelId, MemberId, PanicAction, PanicVote, QuorumThreshold};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Delivery tally for one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

impl DispatchReport {
    fn tally(&mut self, ok: bool) {
        if ok {
            self.delivered += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }
}

/// Build the DM prompt for a vote.
///
/// `initiator` and `target` are display names, already resolved.
pub fn build_prompt(
    vote: &PanicVote,
    quorum: QuorumThreshold,
    initiator: &str,
    target: Option<&str>,
) -> VotePrompt {
    let deadline = vote.deadline.format("%H:%M:%S UTC");
    let mut prompt = match &vote.action {
        PanicAction::Ban { reason, purge_days, .. } => VotePrompt {
            content: "🚨 A Panic Ban vote needs your attention 🚨".to_string(),
            title: format!("Ban {}?", target.unwrap_or("unknown member")),
            description: format!(
                "{} started a vote to ban {}.\nReason: {}\nMessages purged: {} day(s)\nNeeded: {}\nVoting closes at {}.",
                initiator,
                target.unwrap_or("unknown member"),
                reason,
                purge_days,
                quorum,
                deadline
            ),
            button_label: "Vote to ban".to_string(),
            token: vote.id.token(),
        },
        PanicAction::Alert { message } => VotePrompt {
            content: "🚨 A Panic Alert vote needs your attention 🚨".to_string(),
            title: "Alert the administrators?".to_string(),
            description: format!(
                "{} wants to alert the administrators.\nMessage: {}\nNeeded: {}\nVoting closes at {}.",
                initiator, message, quorum, deadline
            ),
            button_label: "Vote to alert".to_string(),
            token: vote.id.token(),
        },
    };
    prompt.description = truncate(&prompt.description, EMBED_DESCRIPTION_MAX_LEN);
    prompt
}

pub struct NotificationDispatcher {
    messaging: Arc<dyn MessagingGateway>,
    telephony: Arc<dyn TelephonyGateway>,
    email: Arc<dyn EmailGateway>,
}

impl NotificationDispatcher {
    pub fn new(
        messaging: Arc<dyn MessagingGateway>,
        telephony: Arc<dyn TelephonyGateway>,
        email: Arc<dyn EmailGateway>,
    ) -> Self {
        Self {
            messaging,
            telephony,
            email,
        }
    }

    /// Send `prompt` to every voter.
    pub async fn send_prompts(&self, voters: &[MemberId], prompt: &VotePrompt) -> DispatchReport {
        let sends = voters.iter().map(|voter| async move {
            match self.messaging.send_vote_prompt(voter, prompt).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(member = %voter, "Failed to send vote prompt: {}", e);
                    false
                }
            }
        });

        let mut report = DispatchReport::default();
        for ok in join_all(sends).await {
            report.tally(ok);
        }
        debug!(
            delivered = report.delivered,
            failed = report.failed,
            "Vote prompts sent"
        );
        report
    }

    /// Forward an alert to every configured contact.
    ///
    /// Discord users and holders of the listed roles get a DM, phone
    /// numbers an SMS, and email addresses go to the email collaborator.
    pub async fn dispatch_alert(
        &self,
        message: &str,
        initiator: &str,
        contacts: &ContactList,
        directory: &MemberDirectory,
    ) -> DispatchReport {
        let text = format!("🚨 Panic alert from {}: {}", initiator, message);

        let mut recipients: BTreeSet<MemberId> = contacts.discord_users.iter().cloned().collect();
        for role in &contacts.discord_roles {
            recipients.extend(directory.members_with_role(role));
        }

        let dms = recipients.iter().map(|member| {
            let text = &text;
            async move {
                match self.messaging.send_dm(member, text).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(member = %member, "Failed to DM alert: {}", e);
                        false
                    }
                }
            }
        });

        let sms_body = truncate(&single_line(&text), SMS_MAX_LEN);
        let texts = contacts.phone_numbers.iter().map(|number| {
            let body = &sms_body;
            async move {
                match self.telephony.send_text(number, body).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(to = %number, "Failed to send alert SMS: {}", e);
                        false
                    }
                }
            }
        });

        let emails = contacts.email_addresses.iter().map(|address| {
            let text = &text;
            async move {
                match self.email.send_email(address, "Panic alert", text).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(to = %address, "Failed to send alert email: {}", e);
                        false
                    }
                }
            }
        });

        let (dm_results, sms_results, email_results) =
            futures::join!(join_all(dms), join_all(texts), join_all(emails));

        let mut report = DispatchReport::default();
        for ok in dm_results.into_iter().chain(sms_results).chain(email_results) {
            report.tally(ok);
        }
        report
    }

    /// Post to a channel (`None` = primary). Failures are logged only.
    pub async fn announce(&self, channel: Option<&ChannelId>, text: &str) -> bool {
        match self.messaging.send_channel_message(channel, text).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to post announcement: {}", e);
                false
            }
        }
    }

    /// Display name for announcements, falling back to a mention.
    pub async fn display_name(&self, member: &MemberId) -> String {
        match self.messaging.display_name(member).await {
            Ok(name) => name,
            Err(e) => {
                debug!(member = %member, "Display name lookup failed: {}", e);
                format!("<@{}>", member)
            }
        }
    }
}
