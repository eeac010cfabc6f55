//! Duration values in the config file.

use panicbot_domain::{ConfigIssue, ConfigIssueCode, DomainError};
use panicbot_domain::vote::parse_duration;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A duration as written in the config file.
///
/// Human-readable strings (`"5m"`, `"1h 30m"`) are preferred; bare integers
/// are nanoseconds, which is how older config files stored them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileDuration {
    Nanos(u64),
    Text(String),
}

impl FileDuration {
    pub fn parse(&self) -> Result<Duration, DomainError> {
        match self {
            FileDuration::Text(s) => parse_duration(s),
            FileDuration::Nanos(0) => Err(DomainError::InvalidDuration {
                value: "0".to_string(),
                reason: "duration must be greater than zero".to_string(),
            }),
            FileDuration::Nanos(n) => Ok(Duration::from_nanos(*n)),
        }
    }

    fn raw(&self) -> String {
        match self {
            FileDuration::Text(s) => s.clone(),
            FileDuration::Nanos(n) => n.to_string(),
        }
    }
}

/// Resolve an optional duration field, falling back to `default`.
///
/// An absent or blank value is silent; an unparseable one yields a warning.
pub fn resolve_duration(
    field: &str,
    value: Option<&FileDuration>,
    default: Duration,
) -> (Duration, Vec<ConfigIssue>) {
    let Some(value) = value else {
        return (default, vec![]);
    };
    if matches!(value, FileDuration::Text(s) if s.trim().is_empty()) {
        return (default, vec![]);
    }
    match value.parse() {
        Ok(d) => (d, vec![]),
        Err(e) => {
            let issue = ConfigIssue::warning(
                ConfigIssueCode::InvalidDuration {
                    field: field.to_string(),
                    value: value.raw(),
                },
                format!(
                    "{}: {}, falling back to {}",
                    field,
                    e,
                    humanize(default)
                ),
            );
            (default, vec![issue])
        }
    }
}

fn humanize(d: Duration) -> String {
    let secs = d.as_secs();
    if secs > 0 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIVE_MIN: Duration = Duration::from_secs(300);

    #[test]
    fn test_text_and_nanos() {
        assert_eq!(
            FileDuration::Text("90s".to_string()).parse().unwrap(),
            Duration::from_secs(90)
        );
        assert_eq!(
            FileDuration::Nanos(60_000_000_000).parse().unwrap(),
            Duration::from_secs(60)
        );
        assert!(FileDuration::Nanos(0).parse().is_err());
    }

    #[test]
    fn test_invalid_value_falls_back_with_warning() {
        let value = FileDuration::Text("soon".to_string());
        let (d, issues) = resolve_duration("voting.voteTimers.panicBanVoteTimer", Some(&value), FIVE_MIN);
        assert_eq!(d, FIVE_MIN);
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
        assert!(issues[0].message.contains("falling back to 5m"));
    }

    #[test]
    fn test_missing_value_is_silent() {
        assert_eq!(resolve_duration("x", None, FIVE_MIN), (FIVE_MIN, vec![]));
        let blank = FileDuration::Text("  ".to_string());
        assert_eq!(resolve_duration("x", Some(&blank), FIVE_MIN), (FIVE_MIN, vec![]));
    }
}
