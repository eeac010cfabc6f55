//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`]: member, role, channel and vote identifiers
//! - [`error::DomainError`]: domain-level errors
//! - [`string`]: text helpers for outbound messages

pub mod error;
pub mod ids;
pub mod string;
