//! Panic vote domain
//!
//! # Lifecycle
//!
//! ```text
//!   trigger command
//!        │
//!        ▼
//!   ┌────────────┐  ballot (|voters| >= quorum)   ┌──────────┐
//!   │ Collecting │ ─────────────────────────────▶ │ Resolved │
//!   └────────────┘                                └──────────┘
//!        │ deadline
//!        ▼
//!   ┌─────────┐
//!   │ Expired │
//!   └─────────┘
//! ```
//!
//! A vote is `Collecting` for as long as it sits in the registry. Removal
//! from the registry is the single transition to a terminal state, which
//! is what makes `Resolved` and `Expired` mutually exclusive.

pub mod entities;
pub mod quorum;
pub mod timer;

pub use entities::{BallotOutcome, MAX_PURGE_DAYS, PanicAction, PanicVote, VoteKind, VoteOutcome};
pub use quorum::{QuorumThreshold, RequiredVotes};
pub use timer::{
    DEFAULT_GRACE_WINDOW, DEFAULT_VOTE_TIMER, VoteTimers, parse_duration, parse_duration_or,
};
