//! Results returned by the lifecycle engine.

use crate::use_cases::notification::DispatchReport;
use chrono::{DateTime, Utc};
use panicbot_domain::{MemberId, VoteId, VoteKind};

/// What happened when a trigger command was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// A vote is now collecting ballots.
    VoteOpened {
        vote_id: VoteId,
        kind: VoteKind,
        eligible_voters: usize,
        prompts: DispatchReport,
        deadline: DateTime<Utc>,
    },
}

/// The action carried out once a vote resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    Banned { target: MemberId },
    /// The vote stays resolved; the failure is announced, not retried.
    BanFailed { target: MemberId, error: String },
    AlertDispatched(DispatchReport),
}

/// What happened to a cast-vote click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastOutcome {
    Recorded {
        kind: VoteKind,
        count: usize,
        remaining: usize,
    },
    /// This ballot met the quorum.
    Resolved { kind: VoteKind, execution: Execution },
    Duplicate { kind: VoteKind },
    NotEligible { kind: VoteKind },
    /// The vote was already resolved or expired.
    Ended,
    /// The correlation token is not a vote id.
    InvalidToken,
}
