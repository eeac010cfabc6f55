//! Configuration issues.
//!
//! Configuration is validated as a whole and every finding is returned as a
//! structured [`ConfigIssue`]. Errors prevent startup; warnings are printed
//! and the affected value falls back to a safe default.

use std::fmt;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the bot cannot start with this configuration.
    Error,
    /// Non-fatal: the bot starts but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A required field is empty (bot token, guild id, ...).
    MissingField { field: String },
    /// A duration string did not parse; the default is used instead.
    InvalidDuration { field: String, value: String },
    /// An enum-like string did not parse; the default is used instead.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
    /// A section is configured but its behavior is not enforced.
    UnenforcedSection { section: String },
    /// A kind of vote can never gather eligible voters.
    NobodyCanVote { kind: String },
}

/// A detected configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", label, self.message)
    }
}
