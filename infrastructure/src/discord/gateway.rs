//! Messaging gateway backed by the Discord REST API

use super::error::DiscordError;
use super::payload::{
    self, ApiChannel, ApiErrorBody, ApiMember, MEMBER_PAGE_LIMIT, pick_primary_channel,
};
use async_trait::async_trait;
use panicbot_application::{GatewayError, MessagingGateway, VotePrompt};
use panicbot_domain::{ChannelId, GuildMember, MemberId};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/streemtech/panicbot, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Discord adapter for a single guild.
///
/// DM channel ids and the discovered primary channel are cached; both are
/// stable for the lifetime of the bot.
pub struct DiscordRestGateway {
    client: Client,
    base_url: String,
    token: String,
    guild_id: String,
    primary_channel: RwLock<Option<ChannelId>>,
    dm_channels: Mutex<HashMap<MemberId, String>>,
}

impl DiscordRestGateway {
    /// Create a gateway, rejecting empty credentials.
    pub fn new(
        token: impl Into<String>,
        guild_id: impl Into<String>,
        primary_channel: Option<ChannelId>,
    ) -> Result<Self, DiscordError> {
        Self::with_base_url(DISCORD_API_BASE, token, guild_id, primary_channel)
    }

    pub fn with_base_url(
        base_url: &str,
        token: impl Into<String>,
        guild_id: impl Into<String>,
        primary_channel: Option<ChannelId>,
    ) -> Result<Self, DiscordError> {
        let token = token.into();
        let guild_id = guild_id.into();
        if token.trim().is_empty() {
            return Err(DiscordError::MissingCredential("discordBotToken"));
        }
        if guild_id.trim().is_empty() {
            return Err(DiscordError::MissingCredential("guildID"));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            guild_id,
            primary_channel: RwLock::new(primary_channel),
            dm_channels: Mutex::new(HashMap::new()),
        })
    }

    pub fn guild_id(&self) -> &str {
        &self.guild_id
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bot {}", self.token))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, DiscordError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) if !body.message.is_empty() => body.message,
            _ => status.canonical_reason().unwrap_or("Unknown").to_string(),
        };
        Err(DiscordError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DiscordError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| DiscordError::Decode(e.to_string()))
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Response, DiscordError> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    async fn dm_channel(&self, member: &MemberId) -> Result<String, DiscordError> {
        let cached = self
            .dm_channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(member)
            .cloned();
        if let Some(id) = cached {
            return Ok(id);
        }

        let channel: ApiChannel = self
            .post_json("/users/@me/channels", &payload::dm_channel_body(member.as_str()))
            .await?
            .json()
            .await
            .map_err(|e| DiscordError::Decode(e.to_string()))?;

        self.dm_channels
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(member.clone(), channel.id.clone());
        Ok(channel.id)
    }

    async fn post_message(&self, channel: &str, body: &Value) -> Result<(), DiscordError> {
        self.post_json(&format!("/channels/{}/messages", channel), body)
            .await?;
        Ok(())
    }

    /// The configured primary channel, or one discovered from the guild.
    pub async fn primary_channel(&self) -> Result<ChannelId, DiscordError> {
        let configured = self
            .primary_channel
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(channel) = configured {
            return Ok(channel);
        }

        let channels: Vec<ApiChannel> = self
            .get_json(&format!("/guilds/{}/channels", self.guild_id))
            .await?;
        let channel =
            pick_primary_channel(&self.guild_id, &channels).ok_or(DiscordError::NoPrimaryChannel)?;
        info!(channel = %channel, "Discovered primary channel");

        *self
            .primary_channel
            .write()
            .unwrap_or_else(|e| e.into_inner()) = Some(channel.clone());
        Ok(channel)
    }

    async fn fetch_members(&self) -> Result<Vec<GuildMember>, DiscordError> {
        let mut members = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let path = payload::members_path(&self.guild_id, after.as_deref());
            let page: Vec<ApiMember> = self.get_json(&path).await?;
            let page_len = page.len();
            after = page.last().map(|m| m.user.id.clone());

            members.extend(
                page.into_iter()
                    .filter(|m| !m.user.bot)
                    .map(ApiMember::into_guild_member),
            );

            if page_len < MEMBER_PAGE_LIMIT || after.is_none() {
                break;
            }
        }

        debug!(count = members.len(), "Fetched guild members");
        Ok(members)
    }
}

#[async_trait]
impl MessagingGateway for DiscordRestGateway {
    async fn send_dm(&self, member: &MemberId, text: &str) -> Result<(), GatewayError> {
        let channel = self.dm_channel(member).await?;
        self.post_message(&channel, &payload::message_body(text))
            .await?;
        Ok(())
    }

    async fn send_vote_prompt(
        &self,
        member: &MemberId,
        prompt: &VotePrompt,
    ) -> Result<(), GatewayError> {
        let channel = self.dm_channel(member).await?;
        self.post_message(&channel, &payload::prompt_body(prompt))
            .await?;
        Ok(())
    }

    async fn send_channel_message(
        &self,
        channel: Option<&ChannelId>,
        text: &str,
    ) -> Result<(), GatewayError> {
        let channel = match channel.filter(|c| !c.is_empty()) {
            Some(channel) => channel.clone(),
            None => self.primary_channel().await?,
        };
        self.post_message(channel.as_str(), &payload::message_body(text))
            .await?;
        Ok(())
    }

    async fn ban_member(
        &self,
        member: &MemberId,
        reason: &str,
        purge_days: u8,
    ) -> Result<(), GatewayError> {
        let request = self
            .request(
                Method::PUT,
                &format!("/guilds/{}/bans/{}", self.guild_id, member),
            )
            .header("X-Audit-Log-Reason", payload::audit_reason_header(reason))
            .json(&payload::ban_body(purge_days));

        match self.send(request).await {
            Ok(_) => {
                info!(member = %member, purge_days, "Member banned");
                Ok(())
            }
            Err(e) => {
                warn!(member = %member, error = %e, "Ban request failed");
                Err(e.into())
            }
        }
    }

    async fn guild_members(&self) -> Result<Vec<GuildMember>, GatewayError> {
        Ok(self.fetch_members().await?)
    }

    async fn display_name(&self, member: &MemberId) -> Result<String, GatewayError> {
        let fetched: ApiMember = self
            .get_json(&format!("/guilds/{}/members/{}", self.guild_id, member))
            .await?;
        Ok(fetched.user.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_token() {
        let err = DiscordRestGateway::new("", "guild", None).err().unwrap();
        assert!(matches!(err, DiscordError::MissingCredential("discordBotToken")));
    }

    #[test]
    fn test_new_rejects_empty_guild() {
        let err = DiscordRestGateway::new("token", "  ", None).err().unwrap();
        assert!(matches!(err, DiscordError::MissingCredential("guildID")));
    }

    #[tokio::test]
    async fn test_configured_primary_channel_needs_no_lookup() {
        // Unroutable base URL: any request would fail
        let gateway = DiscordRestGateway::with_base_url(
            "http://127.0.0.1:9",
            "token",
            "guild",
            Some(ChannelId::from("general")),
        )
        .unwrap();
        assert_eq!(
            gateway.primary_channel().await.unwrap(),
            ChannelId::from("general")
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let gateway =
            DiscordRestGateway::with_base_url("http://localhost/api/", "t", "g", None).unwrap();
        assert_eq!(gateway.base_url, "http://localhost/api");
        assert_eq!(gateway.guild_id(), "g");
    }
}
