//! Permission evaluation for panic votes.
//!
//! [`can_act`] is the pure allow-list check. [`EligibilityPolicy`] layers
//! the per-kind grace-period carry-over on top of it.

pub mod allow_list;
pub mod eligibility;

pub use allow_list::{AllowList, can_act};
pub use eligibility::{EligibilityPolicy, GracePolicy, GraceScope, VoteStage};
