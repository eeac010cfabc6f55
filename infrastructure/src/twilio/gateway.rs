//! Telephony gateway backed by the Twilio Messages API

use crate::config::FileTwilioConfig;
use async_trait::async_trait;
use panicbot_application::{TelephonyError, TelephonyGateway};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

pub const TWILIO_API_BASE: &str = "https://api.twilio.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Startup errors for the Twilio adapter
#[derive(Error, Debug)]
pub enum TwilioError {
    #[error("{0} cannot be empty. Did you forget to set it in the config?")]
    MissingField(&'static str),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: String,
}

pub struct TwilioGateway {
    client: Client,
    base_url: String,
    account_sid: String,
    /// API key SID, or the account SID when authenticating with the auth token
    username: String,
    password: String,
    from_number: String,
}

impl TwilioGateway {
    pub fn from_config(config: &FileTwilioConfig) -> Result<Self, TwilioError> {
        Self::with_base_url(TWILIO_API_BASE, config)
    }

    pub fn with_base_url(base_url: &str, config: &FileTwilioConfig) -> Result<Self, TwilioError> {
        let require = |field: &'static str, value: &str| {
            if value.trim().is_empty() {
                Err(TwilioError::MissingField(field))
            } else {
                Ok(value.trim().to_string())
            }
        };

        let account_sid = require("accountSID", &config.account_sid)?;
        let (username, password) = if config.auth_token.trim().is_empty() {
            (
                require("apiKey", &config.api_key)?,
                require("apiSecret", &config.api_secret)?,
            )
        } else {
            (account_sid.clone(), config.auth_token.trim().to_string())
        };
        let from_number = require("twilioPhoneNumber", &config.twilio_phone_number)?;

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            account_sid,
            username,
            password,
            from_number,
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }

    pub fn from_number(&self) -> &str {
        &self.from_number
    }
}

#[async_trait]
impl TelephonyGateway for TwilioGateway {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), TelephonyError> {
        let to = to.trim();
        if to.is_empty() {
            return Err(TelephonyError::InvalidNumber(to.to_string()));
        }

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.username, Some(&self.password))
            .form(&[("To", to), ("From", self.from_number.as_str()), ("Body", body)])
            .send()
            .await
            .map_err(|e| TelephonyError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .map(|e| e.message)
                .unwrap_or_default();
            error!(
                to,
                from = %self.from_number,
                status = status.as_u16(),
                "Failed to send text message: {}",
                message
            );
            return Err(TelephonyError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        match response.json::<MessageResponse>().await {
            Ok(sent) => debug!(to, sid = %sent.sid, "Text message queued"),
            Err(e) => debug!(to, error = %e, "Text message sent, response not parsed"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_config() -> FileTwilioConfig {
        FileTwilioConfig {
            account_sid: "AC123".to_string(),
            api_key: "SK456".to_string(),
            api_secret: "secret".to_string(),
            auth_token: String::new(),
            twilio_phone_number: "+15550001111".to_string(),
        }
    }

    #[test]
    fn test_api_key_credentials() {
        let gateway = TwilioGateway::from_config(&key_config()).unwrap();
        assert_eq!(gateway.username, "SK456");
        assert_eq!(gateway.password, "secret");
        assert_eq!(
            gateway.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn test_auth_token_replaces_key_pair() {
        let config = FileTwilioConfig {
            api_key: String::new(),
            api_secret: String::new(),
            auth_token: "tok".to_string(),
            ..key_config()
        };
        let gateway = TwilioGateway::from_config(&config).unwrap();
        assert_eq!(gateway.username, "AC123");
        assert_eq!(gateway.password, "tok");
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        let cases = [
            (
                FileTwilioConfig {
                    account_sid: String::new(),
                    ..key_config()
                },
                "accountSID",
            ),
            (
                FileTwilioConfig {
                    api_secret: String::new(),
                    ..key_config()
                },
                "apiSecret",
            ),
            (
                FileTwilioConfig {
                    twilio_phone_number: " ".to_string(),
                    ..key_config()
                },
                "twilioPhoneNumber",
            ),
        ];
        for (config, field) in cases {
            match TwilioGateway::from_config(&config) {
                Err(TwilioError::MissingField(f)) => assert_eq!(f, field),
                other => panic!("expected missing {}, got {:?}", field, other.err()),
            }
        }
    }

    #[tokio::test]
    async fn test_empty_number_is_invalid() {
        let gateway = TwilioGateway::from_config(&key_config()).unwrap();
        let err = gateway.send_text("  ", "hello").await.unwrap_err();
        assert!(matches!(err, TelephonyError::InvalidNumber(_)));
    }
}
