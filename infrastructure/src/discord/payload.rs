//! Request bodies and response shapes for the Discord REST API.
//!
//! Kept free of I/O so the wire format can be tested directly.

use panicbot_application::VotePrompt;
use panicbot_domain::{ChannelId, GuildMember, RoleId};
use serde::Deserialize;
use serde_json::{Value, json};

/// Embed accent colour for vote prompts (cerise).
pub const PROMPT_COLOR: u32 = 0xDE3163;

/// Page size for guild member listing (Discord's maximum).
pub const MEMBER_PAGE_LIMIT: usize = 1000;

/// Discord caps audit log reasons at 512 characters.
const AUDIT_REASON_MAX_LEN: usize = 512;

const SECONDS_PER_DAY: u32 = 86_400;

// Message component constants
const COMPONENT_ACTION_ROW: u8 = 1;
const COMPONENT_BUTTON: u8 = 2;
const BUTTON_STYLE_DANGER: u8 = 4;
const CHANNEL_TYPE_GUILD_TEXT: u8 = 0;

pub fn message_body(content: &str) -> Value {
    json!({ "content": content })
}

/// DM carrying the vote embed and a single danger-styled button.
///
/// Discord echoes `custom_id` back on click, so it carries the vote token.
pub fn prompt_body(prompt: &VotePrompt) -> Value {
    json!({
        "content": prompt.content,
        "embeds": [{
            "type": "rich",
            "title": prompt.title,
            "description": prompt.description,
            "color": PROMPT_COLOR,
        }],
        "components": [{
            "type": COMPONENT_ACTION_ROW,
            "components": [{
                "type": COMPONENT_BUTTON,
                "style": BUTTON_STYLE_DANGER,
                "label": prompt.button_label,
                "custom_id": prompt.token,
                "emoji": { "name": "🔨" },
            }],
        }],
    })
}

pub fn ban_body(purge_days: u8) -> Value {
    json!({ "delete_message_seconds": u32::from(purge_days.min(7)) * SECONDS_PER_DAY })
}

pub fn dm_channel_body(recipient: &str) -> Value {
    json!({ "recipient_id": recipient })
}

/// Percent-encode a ban reason for the `X-Audit-Log-Reason` header.
pub fn audit_reason_header(reason: &str) -> String {
    let mut encoded = String::with_capacity(reason.len());
    for ch in reason.chars().take(AUDIT_REASON_MAX_LEN) {
        if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '~' | ' ') {
            encoded.push(ch);
        } else {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).bytes() {
                encoded.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    encoded
}

pub fn members_path(guild_id: &str, after: Option<&str>) -> String {
    match after {
        Some(after) => format!(
            "/guilds/{}/members?limit={}&after={}",
            guild_id, MEMBER_PAGE_LIMIT, after
        ),
        None => format!("/guilds/{}/members?limit={}", guild_id, MEMBER_PAGE_LIMIT),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl ApiUser {
    /// `username#discriminator` for legacy accounts, otherwise the username.
    pub fn tag(&self) -> String {
        match self.discriminator.as_deref() {
            Some(d) if !d.is_empty() && d != "0" => format!("{}#{}", self.username, d),
            _ => self.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMember {
    pub user: ApiUser,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl ApiMember {
    pub fn into_guild_member(self) -> GuildMember {
        GuildMember::new(
            self.user.id,
            self.roles.into_iter().map(RoleId::from).collect(),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiChannel {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub position: i64,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

/// The guild's default channel shares the guild id; otherwise the
/// top-most text channel.
pub fn pick_primary_channel(guild_id: &str, channels: &[ApiChannel]) -> Option<ChannelId> {
    if let Some(channel) = channels.iter().find(|c| c.id == guild_id) {
        return Some(ChannelId::new(channel.id.clone()));
    }
    channels
        .iter()
        .filter(|c| c.kind == CHANNEL_TYPE_GUILD_TEXT)
        .min_by_key(|c| c.position)
        .map(|c| ChannelId::new(c.id.clone()))
}
