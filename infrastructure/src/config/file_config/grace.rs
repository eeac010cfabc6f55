//! Grace period configuration (`gracePeriod` section)

use super::duration::{FileDuration, resolve_duration};
use panicbot_domain::vote::DEFAULT_GRACE_WINDOW;
use panicbot_domain::{ConfigIssue, ConfigIssueCode, GracePolicy, GraceScope, RoleId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileGracePeriodConfig {
    /// How long a revoked role keeps counting (default 30m)
    pub window: Option<FileDuration>,
    /// Roles whose removal opens a grace period.
    /// Defaults to `voting.allowedToVote.panicBan.roles`.
    pub roles: Option<Vec<String>>,
    /// none | trigger | cast | both (default both)
    pub alert_scope: Option<String>,
    /// none | trigger | cast | both (default none)
    pub ban_scope: Option<String>,
}

impl FileGracePeriodConfig {
    pub fn to_window(&self) -> (Duration, Vec<ConfigIssue>) {
        resolve_duration("gracePeriod.window", self.window.as_ref(), DEFAULT_GRACE_WINDOW)
    }

    /// Explicit grace roles, if configured.
    pub fn to_roles(&self) -> Option<Vec<RoleId>> {
        self.roles.as_ref().map(|roles| {
            roles
                .iter()
                .filter(|r| !r.trim().is_empty())
                .map(|r| RoleId::new(r.trim()))
                .collect()
        })
    }

    pub fn to_grace_policy(&self) -> (GracePolicy, Vec<ConfigIssue>) {
        let defaults = GracePolicy::default();
        let mut issues = Vec::new();
        let alert = parse_scope(
            "gracePeriod.alertScope",
            self.alert_scope.as_deref(),
            defaults.alert,
            &mut issues,
        );
        let ban = parse_scope(
            "gracePeriod.banScope",
            self.ban_scope.as_deref(),
            defaults.ban,
            &mut issues,
        );
        (GracePolicy { alert, ban }, issues)
    }
}

fn parse_scope(
    field: &str,
    raw: Option<&str>,
    default: GraceScope,
    issues: &mut Vec<ConfigIssue>,
) -> GraceScope {
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse::<GraceScope>() {
        Ok(scope) => scope,
        Err(_) => {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidEnumValue {
                    field: field.to_string(),
                    value: raw.to_string(),
                    valid_values: ["none", "trigger", "cast", "both"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                },
                format!("{}: unknown value '{}', falling back to default", field, raw),
            ));
            default
        }
    }
}
