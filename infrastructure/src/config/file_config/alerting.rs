//! Alerting provider configuration (`alertingMethods` section)

use panicbot_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Twilio credentials
///
/// Either an API key pair (`apiKey` + `apiSecret`) or the account's
/// `authToken` authenticates requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileTwilioConfig {
    #[serde(rename = "accountSID", alias = "accountSid")]
    pub account_sid: String,
    #[serde(rename = "apiKey", alias = "APIKey")]
    pub api_key: String,
    #[serde(rename = "apiSecret", alias = "APISecret")]
    pub api_secret: String,
    pub auth_token: String,
    pub twilio_phone_number: String,
}

impl FileTwilioConfig {
    /// Whether any Twilio field is set.
    pub fn is_configured(&self) -> bool {
        *self != Self::default()
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        if !self.is_configured() {
            return vec![];
        }

        let mut issues = Vec::new();
        let mut require = |field: &str, value: &str| {
            if value.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::MissingField {
                        field: format!("alertingMethods.twilio.{}", field),
                    },
                    format!(
                        "alertingMethods.twilio.{} cannot be empty. Did you forget to set it in the config?",
                        field
                    ),
                ));
            }
        };
        require("accountSID", &self.account_sid);
        require("twilioPhoneNumber", &self.twilio_phone_number);
        if self.auth_token.trim().is_empty() {
            require("apiKey", &self.api_key);
            require("apiSecret", &self.api_secret);
        }
        issues
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEmailAuth {
    pub identity: String,
    pub username: String,
    pub password: String,
    pub host: String,
}

/// SMTP settings. Accepted so existing files load; delivery is not wired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileEmailConfig {
    pub auth: FileEmailAuth,
    pub from: String,
    pub default_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAlertingMethods {
    pub twilio: FileTwilioConfig,
    pub email: FileEmailConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_twilio_is_fine() {
        assert!(FileTwilioConfig::default().validate().is_empty());
    }

    #[test]
    fn test_partial_twilio_reports_missing_fields() {
        let twilio = FileTwilioConfig {
            account_sid: "AC123".to_string(),
            api_key: "SK123".to_string(),
            ..Default::default()
        };
        let fields: Vec<_> = twilio
            .validate()
            .into_iter()
            .map(|issue| match issue.code {
                ConfigIssueCode::MissingField { field } => field,
                other => panic!("unexpected issue {:?}", other),
            })
            .collect();
        assert_eq!(
            fields,
            vec![
                "alertingMethods.twilio.twilioPhoneNumber",
                "alertingMethods.twilio.apiSecret"
            ]
        );
    }

    #[test]
    fn test_auth_token_replaces_api_key_pair() {
        let twilio = FileTwilioConfig {
            account_sid: "AC123".to_string(),
            auth_token: "secret".to_string(),
            twilio_phone_number: "+15550001111".to_string(),
            ..Default::default()
        };
        assert!(twilio.validate().is_empty());
    }
}
