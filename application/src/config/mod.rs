//! Application-level configuration.
//!
//! - [`VotingPolicy`]: allow-lists, quorums, timers and grace settings
//! - [`ContactList`]: administrators notified when an alert passes

pub mod voting_policy;

pub use voting_policy::{ContactList, VotingPolicy};
