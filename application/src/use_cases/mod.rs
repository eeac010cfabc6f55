//! Use cases
//!
//! - [`panic_vote`]: the vote lifecycle engine
//! - [`notification`]: prompt, alert and announcement delivery

pub mod notification;
pub mod panic_vote;
