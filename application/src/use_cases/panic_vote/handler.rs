//! Inbound events to engine calls, engine outcomes to replies.

use super::outcome::{CastOutcome, Execution, StartOutcome};
use super::{PanicVoteEngine, PanicVoteError};
use crate::ports::event_handler::{PanicEventHandler, Reply};
use async_trait::async_trait;
use panicbot_domain::{Actor, MemberId, RoleId, VoteKind};

pub const PERMISSION_DENIED: &str = "I'm sorry, you do not have permission to use this command.";
pub const BAN_VOTE_STARTED: &str = "🚨A Panic Ban vote has started! Voters check your DMs.🚨";
pub const ALERT_VOTE_STARTED: &str = "🚨A Panic Alert vote has started! Voters check your DMs.🚨";
pub const CAST_DUPLICATE: &str = "You have already voted.";
pub const CAST_NOT_ELIGIBLE: &str = "I'm sorry, you are not allowed to vote on this.";
pub const CAST_VOTE_ENDED: &str = "This vote has ended.";
pub const CAST_INVALID: &str = "That button does not belong to a vote.";

fn start_reply(result: Result<StartOutcome, PanicVoteError>) -> Reply {
    match result {
        Ok(StartOutcome::VoteOpened {
            kind: VoteKind::Ban,
            ..
        }) => Reply::public(BAN_VOTE_STARTED),
        Ok(StartOutcome::VoteOpened {
            kind: VoteKind::Alert,
            ..
        }) => Reply::public(ALERT_VOTE_STARTED),
        Err(PanicVoteError::PermissionDenied { .. }) => Reply::private(PERMISSION_DENIED),
        Err(PanicVoteError::InvalidRequest(e)) => Reply::private(format!("Invalid command: {}", e)),
    }
}

fn cast_reply(outcome: CastOutcome) -> Reply {
    let text = match outcome {
        CastOutcome::Recorded { remaining, .. } => format!(
            "✅ Your vote has been recorded. {} more vote(s) needed.",
            remaining
        ),
        CastOutcome::Resolved {
            execution: Execution::BanFailed { .. },
            ..
        } => "✅ Your vote passed the ban, but the ban itself failed.".to_string(),
        CastOutcome::Resolved { .. } => "✅ Your vote has been recorded. The vote passed!".to_string(),
        CastOutcome::Duplicate { .. } => CAST_DUPLICATE.to_string(),
        CastOutcome::NotEligible { .. } => CAST_NOT_ELIGIBLE.to_string(),
        CastOutcome::Ended => CAST_VOTE_ENDED.to_string(),
        CastOutcome::InvalidToken => CAST_INVALID.to_string(),
    };
    Reply::private(text)
}

#[async_trait]
impl PanicEventHandler for PanicVoteEngine {
    async fn on_panic_alert(&self, actor: &Actor, message: &str) -> Reply {
        start_reply(self.start_alert(actor, message).await)
    }

    async fn on_panic_ban(
        &self,
        actor: &Actor,
        target: &MemberId,
        reason: &str,
        days: Option<i64>,
    ) -> Reply {
        start_reply(self.start_ban(actor, target, reason, days).await)
    }

    async fn on_vote_button(&self, member: &MemberId, token: &str) -> Reply {
        cast_reply(self.cast(member, token).await)
    }

    async fn on_role_change(&self, member: &MemberId, added: &[RoleId], removed: &[RoleId]) {
        self.role_changed(member, added, removed);
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock::{MockMessaging, directory_with_mods};
    use super::*;
    use crate::config::VotingPolicy;
    use panicbot_domain::{AllowList, RequiredVotes};
    use std::sync::Arc;

    fn handler() -> Arc<dyn PanicEventHandler> {
        let policy = VotingPolicy::new(
            AllowList::default().with_role("helper"),
            AllowList::default().with_role("mod"),
        )
        .with_required_votes(RequiredVotes::new(0, 2));
        Arc::new(
            PanicVoteEngine::new(Arc::new(MockMessaging::default()), policy)
                .with_directory(Arc::new(directory_with_mods())),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_replies() {
        let handler = handler();
        let moderator = Actor::new("mod0", vec![RoleId::from("mod")]);
        let guest = Actor::new("guest", vec![]);

        let reply = handler
            .on_panic_ban(&guest, &MemberId::from("troll"), "spam", None)
            .await;
        assert_eq!(reply, Reply::private(PERMISSION_DENIED));

        let reply = handler
            .on_panic_ban(&moderator, &MemberId::from("troll"), "spam", Some(1))
            .await;
        assert_eq!(reply, Reply::public(BAN_VOTE_STARTED));

        let reply = handler
            .on_panic_ban(&moderator, &MemberId::from(""), "spam", None)
            .await;
        assert!(reply.ephemeral);
        assert!(reply.content.starts_with("Invalid command"));

        let helper = Actor::new("helper1", vec![RoleId::from("helper")]);
        assert_eq!(
            handler.on_panic_alert(&helper, "raid").await,
            Reply::public(ALERT_VOTE_STARTED)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cast_replies_are_private() {
        let handler = handler();
        let reply = handler
            .on_vote_button(&MemberId::from("mod1"), "garbage")
            .await;
        assert_eq!(reply, Reply::private(CAST_INVALID));

        let unknown = panicbot_domain::VoteId::generate().token();
        let reply = handler.on_vote_button(&MemberId::from("mod1"), &unknown).await;
        assert_eq!(reply, Reply::private(CAST_VOTE_ENDED));
    }

    #[test]
    fn test_recorded_reply_mentions_remaining_votes() {
        let reply = cast_reply(CastOutcome::Recorded {
            kind: VoteKind::Ban,
            count: 1,
            remaining: 2,
        });
        assert!(reply.content.contains("2 more vote(s) needed"));
        assert!(reply.ephemeral);
    }
}
