//! Domain layer for panicbot
//!
//! This crate contains the core business rules of panic voting. It has no
//! dependencies on infrastructure or presentation concerns, and no I/O.
//!
//! # Core Concepts
//!
//! ## Panic vote
//!
//! A quorum-gated request to execute a sensitive action:
//!
//! - **Alert**: forward a message to the configured administrators
//! - **Ban**: ban a disruptive member
//!
//! ## Eligibility
//!
//! Who may start or cast a vote is decided by per-kind allow-lists
//! (member ids and role ids), optionally extended by a **grace period**
//! that preserves eligibility for a bounded time after a qualifying role
//! is revoked.

pub mod config;
pub mod core;
pub mod grace;
pub mod member;
pub mod permission;
pub mod vote;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use core::{
    error::DomainError,
    ids::{ChannelId, MemberId, RoleId, VoteId},
};
pub use grace::GraceEntry;
pub use member::{Actor, GuildMember};
pub use permission::{AllowList, EligibilityPolicy, GracePolicy, GraceScope, VoteStage, can_act};
pub use vote::{
    BallotOutcome, PanicAction, PanicVote, QuorumThreshold, RequiredVotes, VoteKind, VoteOutcome,
    VoteTimers,
};
