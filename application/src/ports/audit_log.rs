//! Port for the structured vote audit log.
//!
//! This is separate from `tracing`-based operation logs: tracing carries
//! human-readable diagnostics, while this port records every vote lifecycle
//! transition in a machine-readable form (JSONL in the file adapter).

use panicbot_domain::{PanicAction, PanicVote, VoteOutcome};
use serde_json::{Value, json};

/// A structured audit event.
pub struct AuditEvent {
    /// Event type identifier (e.g., "vote_started", "ban_executed").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    /// Common payload describing a vote.
    pub fn for_vote(event_type: &'static str, vote: &PanicVote) -> Self {
        let mut payload = json!({
            "vote_id": vote.id.to_string(),
            "kind": vote.kind().as_str(),
            "initiator": vote.initiator.as_str(),
            "ballots": vote.ballot_count(),
            "voters": vote.voters(),
            "deadline": vote.deadline.to_rfc3339(),
        });
        if let (Value::Object(map), PanicAction::Ban { target, reason, purge_days }) =
            (&mut payload, &vote.action)
        {
            map.insert("target".to_string(), json!(target.as_str()));
            map.insert("reason".to_string(), json!(reason));
            map.insert("purge_days".to_string(), json!(purge_days));
        }
        Self::new(event_type, payload)
    }

    /// A vote leaving the registry, tagged with how it ended.
    pub fn for_closed_vote(vote: &PanicVote, outcome: VoteOutcome) -> Self {
        let event_type = match outcome {
            VoteOutcome::Resolved => "vote_resolved",
            VoteOutcome::Expired => "vote_expired",
        };
        let mut event = Self::for_vote(event_type, vote);
        if let Value::Object(map) = &mut event.payload {
            map.insert("outcome".to_string(), json!(outcome));
        }
        event
    }
}

/// Port for recording audit events.
///
/// `record` is synchronous and non-fallible so that auditing can never
/// disrupt vote processing; write failures are swallowed by adapters.
pub trait AuditLog: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// No-op implementation for tests and when auditing is disabled.
pub struct NoAuditLog;

impl AuditLog for NoAuditLog {
    fn record(&self, _event: AuditEvent) {}
}
