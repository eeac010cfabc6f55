//! Quorum thresholds
//!
//! A panic vote resolves once the number of distinct voters reaches the
//! threshold configured for its kind.

use super::entities::VoteKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum number of distinct voters required to resolve a vote.
///
/// `0` means "not configured". For alerts this disables voting entirely
/// (the alert is dispatched on trigger); for bans it behaves like `1`.
///
/// # Example
///
/// ```
/// use panicbot_domain::vote::QuorumThreshold;
///
/// let quorum = QuorumThreshold::new(3);
/// assert!(!quorum.is_met(2));
/// assert!(quorum.is_met(3));
/// assert!(quorum.is_met(4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuorumThreshold(usize);

impl QuorumThreshold {
    pub fn new(required: usize) -> Self {
        Self(required)
    }

    pub fn is_configured(&self) -> bool {
        self.0 > 0
    }

    /// Votes actually needed; never less than one.
    pub fn required(&self) -> usize {
        self.0.max(1)
    }

    /// `>=` rather than `==` so an over-count can never skip resolution.
    pub fn is_met(&self, ballots: usize) -> bool {
        ballots >= self.required()
    }

    pub fn remaining(&self, ballots: usize) -> usize {
        self.required().saturating_sub(ballots)
    }
}

impl fmt::Display for QuorumThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vote(s)", self.required())
    }
}

/// Per-kind quorum thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequiredVotes {
    pub panic_alert: QuorumThreshold,
    pub panic_ban: QuorumThreshold,
}

impl RequiredVotes {
    pub fn new(panic_alert: usize, panic_ban: usize) -> Self {
        Self {
            panic_alert: QuorumThreshold::new(panic_alert),
            panic_ban: QuorumThreshold::new(panic_ban),
        }
    }

    pub fn for_kind(&self, kind: VoteKind) -> QuorumThreshold {
        match kind {
            VoteKind::Alert => self.panic_alert,
            VoteKind::Ban => self.panic_ban,
        }
    }
}
