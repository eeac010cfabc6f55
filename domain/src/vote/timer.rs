//! Vote timers and duration parsing.
//!
//! Durations come from configuration as human-readable strings such as
//! `"5m"`, `"90s"` or `"1h 30m"`. A value that fails to parse never blocks
//! vote creation; the caller receives the fallback plus the parse error.

use super::entities::VoteKind;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fallback vote window when none (or an invalid one) is configured.
pub const DEFAULT_VOTE_TIMER: Duration = Duration::from_secs(5 * 60);

/// How long a member keeps eligibility after losing a qualifying role.
pub const DEFAULT_GRACE_WINDOW: Duration = Duration::from_secs(30 * 60);

/// Parse a duration string. Empty and zero durations are rejected.
pub fn parse_duration(raw: &str) -> Result<Duration, DomainError> {
    let trimmed = raw.trim();
    let parsed = humantime::parse_duration(trimmed).map_err(|e| DomainError::InvalidDuration {
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    if parsed.is_zero() {
        return Err(DomainError::InvalidDuration {
            value: raw.to_string(),
            reason: "duration must be greater than zero".to_string(),
        });
    }
    Ok(parsed)
}

/// Parse `raw`, falling back to `default` when it is missing or invalid.
///
/// Returns the error alongside the fallback so the caller can report it.
pub fn parse_duration_or(
    raw: Option<&str>,
    default: Duration,
) -> (Duration, Option<DomainError>) {
    match raw {
        None => (default, None),
        Some(s) if s.trim().is_empty() => (default, None),
        Some(s) => match parse_duration(s) {
            Ok(d) => (d, None),
            Err(e) => (default, Some(e)),
        },
    }
}

/// Per-kind vote windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTimers {
    pub panic_alert: Duration,
    pub panic_ban: Duration,
}

impl Default for VoteTimers {
    fn default() -> Self {
        Self {
            panic_alert: DEFAULT_VOTE_TIMER,
            panic_ban: DEFAULT_VOTE_TIMER,
        }
    }
}

impl VoteTimers {
    pub fn for_kind(&self, kind: VoteKind) -> Duration {
        match kind {
            VoteKind::Alert => self.panic_alert,
            VoteKind::Ban => self.panic_ban,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_common_forms() {
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("1h 30m").unwrap(), Duration::from_secs(5400));
    }

    #[test]
    fn test_parse_rejects_garbage_and_zero() {
        assert!(parse_duration("five minutes please").is_err());
        assert!(parse_duration("0s").is_err());
    }

    #[test]
    fn test_invalid_timer_falls_back_to_default() {
        let (d, err) = parse_duration_or(Some("not-a-duration"), DEFAULT_VOTE_TIMER);
        assert_eq!(d, Duration::from_secs(300));
        assert!(matches!(err, Some(DomainError::InvalidDuration { .. })));
    }

    #[test]
    fn test_missing_timer_uses_default_silently() {
        assert_eq!(
            parse_duration_or(None, DEFAULT_GRACE_WINDOW),
            (DEFAULT_GRACE_WINDOW, None)
        );
        assert_eq!(
            parse_duration_or(Some(""), DEFAULT_VOTE_TIMER),
            (DEFAULT_VOTE_TIMER, None)
        );
    }

    #[test]
    fn test_vote_timers_for_kind() {
        let timers = VoteTimers {
            panic_alert: Duration::from_secs(60),
            ..Default::default()
        };
        assert_eq!(timers.for_kind(VoteKind::Alert), Duration::from_secs(60));
        assert_eq!(timers.for_kind(VoteKind::Ban), DEFAULT_VOTE_TIMER);
    }
}
