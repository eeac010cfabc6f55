//! Application layer for panicbot
//!
//! This crate contains the vote lifecycle engine, the in-memory registries,
//! port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod registry;
pub mod scheduler;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ContactList, VotingPolicy};
pub use ports::{
    audit_log::{AuditEvent, AuditLog, NoAuditLog},
    email_gateway::{EmailGateway, NoEmail},
    event_handler::{PanicEventHandler, Reply},
    messaging_gateway::{GatewayError, MessagingGateway, VotePrompt},
    telephony_gateway::{NoTelephony, TelephonyError, TelephonyGateway},
};
pub use registry::{
    CastResult, DEFAULT_REFRESH_INTERVAL, GraceRegistry, MemberDirectory, VoteRegistry,
};
pub use scheduler::{ScheduledTask, SchedulerError, Ticker, schedule_once, ticker};
pub use use_cases::notification::{DispatchReport, NotificationDispatcher, build_prompt};
pub use use_cases::panic_vote::{
    CastOutcome, Execution, PanicVoteEngine, PanicVoteError, StartOutcome,
};
