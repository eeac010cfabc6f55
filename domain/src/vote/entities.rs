//! Panic vote entities
//!
//! A [`PanicVote`] is one outstanding request to execute a [`PanicAction`].
//! It collects ballots from the moment it is created until it is either
//! resolved (quorum reached) or expired (deadline passed).

use crate::core::error::DomainError;
use crate::core::ids::{MemberId, VoteId};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

/// Upper bound on days of message history a ban may purge.
pub const MAX_PURGE_DAYS: u8 = 7;

/// The two kinds of panic action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Alert,
    Ban,
}

impl VoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteKind::Alert => "alert",
            VoteKind::Ban => "ban",
        }
    }

    /// Slash-command name that triggers this kind.
    pub fn command_name(&self) -> &'static str {
        match self {
            VoteKind::Alert => "panicalert",
            VoteKind::Ban => "panicban",
        }
    }
}

impl fmt::Display for VoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens when a vote reaches quorum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PanicAction {
    /// Forward `message` to the configured administrators.
    Alert { message: String },
    /// Ban `target`, purging `purge_days` days of their message history.
    Ban {
        target: MemberId,
        reason: String,
        purge_days: u8,
    },
}

impl PanicAction {
    pub fn alert(message: impl Into<String>) -> Result<Self, DomainError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(DomainError::EmptyAlertMessage);
        }
        Ok(PanicAction::Alert { message })
    }

    /// Build a ban action. Missing or out-of-range `days` are clamped to
    /// `0..=MAX_PURGE_DAYS`.
    pub fn ban(
        target: MemberId,
        reason: impl Into<String>,
        days: Option<i64>,
    ) -> Result<Self, DomainError> {
        if target.is_empty() {
            return Err(DomainError::EmptyBanTarget);
        }
        let purge_days = days.unwrap_or(0).clamp(0, MAX_PURGE_DAYS as i64) as u8;
        Ok(PanicAction::Ban {
            target,
            reason: reason.into(),
            purge_days,
        })
    }

    pub fn kind(&self) -> VoteKind {
        match self {
            PanicAction::Alert { .. } => VoteKind::Alert,
            PanicAction::Ban { .. } => VoteKind::Ban,
        }
    }
}

/// Result of recording a ballot on a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallotOutcome {
    /// The ballot was counted; `count` is the new number of distinct voters.
    Recorded { count: usize },
    /// The member had already voted; nothing changed.
    Duplicate,
}

/// Terminal state of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteOutcome {
    /// Quorum reached; the action was (attempted to be) executed.
    Resolved,
    /// Deadline passed without quorum.
    Expired,
}

/// One outstanding panic vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicVote {
    pub id: VoteId,
    pub initiator: MemberId,
    pub action: PanicAction,
    voters: HashSet<MemberId>,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
}

impl PanicVote {
    /// Create a vote that collects ballots for `window` starting now.
    pub fn new(initiator: MemberId, action: PanicAction, window: Duration) -> Self {
        Self::starting_at(initiator, action, Utc::now(), window)
    }

    pub fn starting_at(
        initiator: MemberId,
        action: PanicAction,
        created_at: DateTime<Utc>,
        window: Duration,
    ) -> Self {
        let window = TimeDelta::from_std(window).unwrap_or(TimeDelta::MAX);
        Self {
            id: VoteId::generate(),
            initiator,
            action,
            voters: HashSet::new(),
            created_at,
            deadline: created_at.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn kind(&self) -> VoteKind {
        self.action.kind()
    }

    /// Count `member`'s ballot unless they already voted.
    pub fn record_ballot(&mut self, member: MemberId) -> BallotOutcome {
        if self.voters.insert(member) {
            BallotOutcome::Recorded {
                count: self.voters.len(),
            }
        } else {
            BallotOutcome::Duplicate
        }
    }

    pub fn ballot_count(&self) -> usize {
        self.voters.len()
    }

    pub fn has_voted(&self, member: &MemberId) -> bool {
        self.voters.contains(member)
    }

    /// Voters in a stable order, for announcements and audit records.
    pub fn voters(&self) -> Vec<MemberId> {
        let mut voters: Vec<_> = self.voters.iter().cloned().collect();
        voters.sort();
        voters
    }

    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline
    }
}
