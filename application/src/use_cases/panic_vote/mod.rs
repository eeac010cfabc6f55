//! Vote Lifecycle Engine.
//!
//! Orchestrates a panic vote from trigger to terminal state:
//!
//! ```text
//! trigger ──▶ authorize ──▶ register ──▶ prompt voters
//!                               │
//!                 ┌─────────────┴─────────────┐
//!            ballot reaches quorum        deadline timer
//!                 │                           │
//!          remove + execute            remove + announce failure
//! ```
//!
//! Both terminal paths go through a registry removal; the loser of a race
//! finds the vote gone and does nothing. Gateway calls happen only after
//! the registry lock is released.

mod handler;
pub mod outcome;

#[cfg(test)]
mod mock;

pub use handler::{
    ALERT_VOTE_STARTED, BAN_VOTE_STARTED, CAST_DUPLICATE, CAST_INVALID,
    CAST_NOT_ELIGIBLE, CAST_VOTE_ENDED, PERMISSION_DENIED,
};
pub use outcome::{CastOutcome, Execution, StartOutcome};

use crate::config::VotingPolicy;
use crate::ports::audit_log::{AuditEvent, AuditLog, NoAuditLog};
use crate::ports::email_gateway::{EmailGateway, NoEmail};
use crate::ports::messaging_gateway::{GatewayError, MessagingGateway};
use crate::ports::telephony_gateway::{NoTelephony, TelephonyGateway};
use crate::registry::{CastResult, GraceRegistry, MemberDirectory, VoteRegistry};
use crate::scheduler::{SchedulerError, Ticker, schedule_once};
use crate::use_cases::notification::{DispatchReport, NotificationDispatcher, build_prompt};
use panicbot_domain::{
    Actor, DomainError, MemberId, PanicAction, PanicVote, RoleId, VoteId, VoteKind, VoteOutcome,
    VoteStage,
};
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Why a trigger command was refused.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PanicVoteError {
    #[error("{member} is not allowed to start a panic {kind} vote")]
    PermissionDenied { member: MemberId, kind: VoteKind },

    #[error(transparent)]
    InvalidRequest(#[from] DomainError),
}

/// The engine. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct PanicVoteEngine {
    policy: Arc<VotingPolicy>,
    votes: Arc<VoteRegistry>,
    grace: Arc<GraceRegistry>,
    directory: Arc<MemberDirectory>,
    messaging: Arc<dyn MessagingGateway>,
    telephony: Arc<dyn TelephonyGateway>,
    email: Arc<dyn EmailGateway>,
    notifier: Arc<NotificationDispatcher>,
    audit: Arc<dyn AuditLog>,
}

impl PanicVoteEngine {
    pub fn new(messaging: Arc<dyn MessagingGateway>, policy: VotingPolicy) -> Self {
        let grace = GraceRegistry::new(policy.grace_window, policy.grace_roles.clone());
        let telephony: Arc<dyn TelephonyGateway> = Arc::new(NoTelephony);
        let email: Arc<dyn EmailGateway> = Arc::new(NoEmail);
        let notifier =
            NotificationDispatcher::new(messaging.clone(), telephony.clone(), email.clone());
        Self {
            policy: Arc::new(policy),
            votes: Arc::new(VoteRegistry::new()),
            grace: Arc::new(grace),
            directory: Arc::new(MemberDirectory::new()),
            messaging,
            telephony,
            email,
            notifier: Arc::new(notifier),
            audit: Arc::new(NoAuditLog),
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_telephony(mut self, telephony: Arc<dyn TelephonyGateway>) -> Self {
        self.telephony = telephony;
        self.rebuild_notifier();
        self
    }

    pub fn with_email(mut self, email: Arc<dyn EmailGateway>) -> Self {
        self.email = email;
        self.rebuild_notifier();
        self
    }

    pub fn with_audit_log(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_directory(mut self, directory: Arc<MemberDirectory>) -> Self {
        self.directory = directory;
        self
    }

    fn rebuild_notifier(&mut self) {
        self.notifier = Arc::new(NotificationDispatcher::new(
            self.messaging.clone(),
            self.telephony.clone(),
            self.email.clone(),
        ));
    }

    // ==================== Accessors ====================

    pub fn policy(&self) -> &VotingPolicy {
        &self.policy
    }

    pub fn directory(&self) -> &Arc<MemberDirectory> {
        &self.directory
    }

    pub fn grace(&self) -> &Arc<GraceRegistry> {
        &self.grace
    }

    /// Live votes, oldest first.
    pub fn outstanding_votes(&self) -> Vec<PanicVote> {
        self.votes.snapshot()
    }

    // ==================== Member directory ====================

    pub async fn refresh_members(&self) -> Result<usize, GatewayError> {
        self.directory.refresh(self.messaging.as_ref()).await
    }

    pub fn spawn_member_refresh(&self, period: Duration) -> Result<Ticker, SchedulerError> {
        self.directory.spawn_refresh(self.messaging.clone(), period)
    }

    // ==================== Triggers ====================

    /// `/panicalert`: open an alert vote. With no alert quorum configured
    /// the first eligible cast sends the alert.
    pub async fn start_alert(
        &self,
        actor: &Actor,
        message: &str,
    ) -> Result<StartOutcome, PanicVoteError> {
        self.authorize(VoteKind::Alert, actor)?;
        let action = PanicAction::alert(message)?;
        Ok(self.open_vote(&actor.id, action).await)
    }

    /// `/panicban`: open a ban vote against `target`.
    pub async fn start_ban(
        &self,
        actor: &Actor,
        target: &MemberId,
        reason: &str,
        days: Option<i64>,
    ) -> Result<StartOutcome, PanicVoteError> {
        self.authorize(VoteKind::Ban, actor)?;
        if *target == actor.id {
            return Err(DomainError::SelfBan.into());
        }
        let action = PanicAction::ban(target.clone(), reason, days)?;
        Ok(self.open_vote(&actor.id, action).await)
    }

    fn authorize(&self, kind: VoteKind, actor: &Actor) -> Result<(), PanicVoteError> {
        let roles = if actor.roles.is_empty() {
            self.directory.roles_of(&actor.id)
        } else {
            actor.roles.clone()
        };
        if self.is_eligible(kind, VoteStage::Trigger, &actor.id, &roles) {
            return Ok(());
        }
        warn!(member = %actor.id, kind = %kind, "Permission denied for panic command");
        Err(PanicVoteError::PermissionDenied {
            member: actor.id.clone(),
            kind,
        })
    }

    fn is_eligible(
        &self,
        kind: VoteKind,
        stage: VoteStage,
        member: &MemberId,
        roles: &[RoleId],
    ) -> bool {
        let in_grace = self.grace.is_in_grace(member);
        self.policy
            .eligibility
            .is_eligible(kind, stage, member, roles, in_grace)
    }

    /// Everyone who may cast on a vote of `kind`, sorted.
    fn eligible_voters(&self, kind: VoteKind) -> Vec<MemberId> {
        let mut voters: BTreeSet<MemberId> = self
            .directory
            .members()
            .into_iter()
            .filter(|m| self.is_eligible(kind, VoteStage::Cast, &m.id, &m.roles))
            .map(|m| m.id)
            .collect();
        voters.extend(self.policy.eligibility.allow_list(kind).users.iter().cloned());
        voters.into_iter().collect()
    }

    async fn open_vote(&self, initiator: &MemberId, action: PanicAction) -> StartOutcome {
        let kind = action.kind();
        let window = self.policy.vote_timers.for_kind(kind);
        let quorum = self.policy.required_votes.for_kind(kind);
        let vote = PanicVote::new(initiator.clone(), action, window);
        let (vote_id, deadline) = (vote.id, vote.deadline);

        let initiator_name = self.notifier.display_name(initiator).await;
        let target_name = match &vote.action {
            PanicAction::Ban { target, .. } => Some(self.notifier.display_name(target).await),
            PanicAction::Alert { .. } => None,
        };
        let prompt = build_prompt(&vote, quorum, &initiator_name, target_name.as_deref());
        let voters = self.eligible_voters(kind);

        self.audit.record(AuditEvent::for_vote("vote_started", &vote));
        self.votes.insert(vote, quorum);
        self.schedule_expiry(vote_id, window);
        info!(
            vote_id = %vote_id,
            kind = %kind,
            initiator = %initiator,
            required = quorum.required(),
            voters = voters.len(),
            "Panic vote started"
        );

        let prompts = self.notifier.send_prompts(&voters, &prompt).await;
        if prompts.delivered == 0 {
            warn!(vote_id = %vote_id, "No voter could be prompted");
        }

        StartOutcome::VoteOpened {
            vote_id,
            kind,
            eligible_voters: voters.len(),
            prompts,
            deadline,
        }
    }

    fn schedule_expiry(&self, vote_id: VoteId, window: Duration) {
        let engine = self.clone();
        schedule_once(window, async move {
            engine.expire(&vote_id).await;
        });
    }

    /// Deadline handler. Returns `false` if the vote had already resolved.
    async fn expire(&self, vote_id: &VoteId) -> bool {
        let Some(vote) = self.votes.expire(vote_id) else {
            debug!(vote_id = %vote_id, "Vote already resolved before its deadline");
            return false;
        };

        let quorum = self.policy.required_votes.for_kind(vote.kind());
        info!(
            vote_id = %vote_id,
            ballots = vote.ballot_count(),
            required = quorum.required(),
            "Panic vote expired"
        );
        self.audit.record(AuditEvent::for_closed_vote(&vote, VoteOutcome::Expired));

        let subject = match &vote.action {
            PanicAction::Ban { target, .. } => {
                format!("ban {}", self.notifier.display_name(target).await)
            }
            PanicAction::Alert { .. } => "alert the administrators".to_string(),
        };
        let text = format!(
            "❌ The vote to {} failed: not enough votes within the window ({} of {}).",
            subject,
            vote.ballot_count(),
            quorum.required()
        );
        self.notifier
            .announce(self.policy.primary_channel.as_ref(), &text)
            .await;
        true
    }

    // ==================== Casting ====================

    /// A cast-vote button was pressed by `member` on the prompt for `token`.
    pub async fn cast(&self, member: &MemberId, token: &str) -> CastOutcome {
        let Some(vote_id) = VoteId::from_token(token) else {
            debug!(member = %member, token, "Cast with an unknown token");
            return CastOutcome::InvalidToken;
        };

        let roles = self.directory.roles_of(member);
        let in_grace = self.grace.is_in_grace(member);
        let eligibility = &self.policy.eligibility;
        let result = self.votes.cast(&vote_id, member, |kind| {
            eligibility.is_eligible(kind, VoteStage::Cast, member, &roles, in_grace)
        });

        match result {
            CastResult::NotFound => {
                debug!(vote_id = %vote_id, member = %member, "Cast on a vote that has ended");
                CastOutcome::Ended
            }
            CastResult::NotEligible { kind } => {
                warn!(vote_id = %vote_id, member = %member, "Cast by an ineligible member");
                CastOutcome::NotEligible { kind }
            }
            CastResult::Duplicate { kind } => {
                debug!(vote_id = %vote_id, member = %member, "Duplicate cast");
                CastOutcome::Duplicate { kind }
            }
            CastResult::Recorded {
                kind,
                count,
                remaining,
            } => {
                info!(vote_id = %vote_id, member = %member, count, remaining, "Ballot recorded");
                self.record_ballot(&vote_id, member, count);
                CastOutcome::Recorded {
                    kind,
                    count,
                    remaining,
                }
            }
            CastResult::QuorumReached(vote) => {
                self.record_ballot(&vote_id, member, vote.ballot_count());
                let kind = vote.kind();
                let execution = self.resolve(vote).await;
                CastOutcome::Resolved { kind, execution }
            }
        }
    }

    fn record_ballot(&self, vote_id: &VoteId, member: &MemberId, count: usize) {
        self.audit.record(AuditEvent::new(
            "ballot_cast",
            json!({
                "vote_id": vote_id.to_string(),
                "member": member.as_str(),
                "ballots": count,
            }),
        ));
    }

    /// Carry out a vote that met its quorum. The vote is already out of
    /// the registry.
    async fn resolve(&self, vote: PanicVote) -> Execution {
        info!(
            vote_id = %vote.id,
            kind = %vote.kind(),
            ballots = vote.ballot_count(),
            "Panic vote resolved"
        );
        self.audit.record(AuditEvent::for_closed_vote(&vote, VoteOutcome::Resolved));
        let channel = self.policy.primary_channel.as_ref();

        match &vote.action {
            PanicAction::Ban {
                target,
                reason,
                purge_days,
            } => {
                let name = self.notifier.display_name(target).await;
                match self.messaging.ban_member(target, reason, *purge_days).await {
                    Ok(()) => {
                        info!(vote_id = %vote.id, target = %target, "Member banned");
                        self.audit.record(AuditEvent::for_vote("ban_executed", &vote));
                        let text = format!(
                            "🔨 {} has been banned by panic vote ({} votes). Reason: {}",
                            name,
                            vote.ballot_count(),
                            reason
                        );
                        self.notifier.announce(channel, &text).await;
                        Execution::Banned {
                            target: target.clone(),
                        }
                    }
                    Err(e) => {
                        error!(vote_id = %vote.id, target = %target, "Ban failed: {}", e);
                        let mut event = AuditEvent::for_vote("ban_failed", &vote);
                        if let Some(map) = event.payload.as_object_mut() {
                            map.insert("error".to_string(), json!(e.to_string()));
                        }
                        self.audit.record(event);
                        let text = format!(
                            "⚠️ The panic vote to ban {} passed, but the ban failed: {}",
                            name, e
                        );
                        self.notifier.announce(channel, &text).await;
                        Execution::BanFailed {
                            target: target.clone(),
                            error: e.to_string(),
                        }
                    }
                }
            }
            PanicAction::Alert { message } => {
                let initiator = self.notifier.display_name(&vote.initiator).await;
                Execution::AlertDispatched(self.execute_alert(message, &initiator).await)
            }
        }
    }

    async fn execute_alert(&self, message: &str, initiator: &str) -> DispatchReport {
        let contacts = &self.policy.contacts;
        if contacts.is_empty() {
            warn!("Panic alert raised but no contacts are configured");
        }
        let report = self
            .notifier
            .dispatch_alert(message, initiator, contacts, &self.directory)
            .await;
        info!(
            delivered = report.delivered,
            failed = report.failed,
            "Panic alert dispatched"
        );
        self.audit.record(AuditEvent::new(
            "alert_dispatched",
            json!({
                "initiator": initiator,
                "message": message,
                "delivered": report.delivered,
                "failed": report.failed,
            }),
        ));
        self.notifier
            .announce(
                self.policy.primary_channel.as_ref(),
                "🚨 A panic alert has been sent to the administrators. 🚨",
            )
            .await;
        report
    }

    // ==================== Role changes ====================

    /// Keep the directory current and open grace periods for removed
    /// qualifying roles.
    pub fn role_changed(&self, member: &MemberId, added: &[RoleId], removed: &[RoleId]) {
        self.directory.apply_role_change(member, added, removed);
        for role in removed {
            if let Some(entry) = self.grace.on_role_revoked(member, role) {
                self.audit.record(AuditEvent::new(
                    "grace_recorded",
                    json!({
                        "member": member.as_str(),
                        "role": role.as_str(),
                        "revoked_at": entry.revoked_at.to_rfc3339(),
                        "window_secs": self.grace.window().as_secs(),
                    }),
                ));
            }
        }
    }
}
