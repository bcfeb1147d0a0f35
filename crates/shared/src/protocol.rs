use serde::{Deserialize, Serialize};

use crate::domain::{ChannelId, GuildId, MessageId, UserId};

/// `GET /api/config`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub guild_id: GuildId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// `GET /api/channels/{guild_id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelListResponse {
    #[serde(default)]
    pub channels: Vec<Channel>,
}

/// `GET /api/bot/status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotStatus {
    #[serde(default)]
    pub online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_count: Option<u64>,
    #[serde(default, rename = "latency", skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    #[serde(default, rename = "user", skip_serializing_if = "Option::is_none")]
    pub bot_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BotStatus {
    pub fn online(bot_user: impl Into<String>, guild_count: u64, latency_ms: f64) -> Self {
        Self {
            online: true,
            guild_count: Some(guild_count),
            latency_ms: Some(latency_ms),
            bot_user: Some(bot_user.into()),
            error: None,
        }
    }

    pub fn offline(reason: impl Into<String>) -> Self {
        Self {
            online: false,
            error: Some(reason.into()),
            ..Self::default()
        }
    }
}

/// `POST /api/message/send`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub channel_id: ChannelId,
    pub content: String,
}

/// `POST /api/message/embed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedMessageRequest {
    pub channel_id: ChannelId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Reply of both message endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSendResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET|POST /api/events/join/...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinConfig {
    pub guild_id: GuildId,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<ChannelId>,
    #[serde(default)]
    pub message_template: String,
    #[serde(default)]
    pub embed_enabled: bool,
}

/// `GET|POST /api/events/leave/...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveConfig {
    pub guild_id: GuildId,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<ChannelId>,
    #[serde(default)]
    pub message_template: String,
}

/// `GET|POST /api/events/join-dm/...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinDmConfig {
    pub guild_id: GuildId,
    pub enabled: bool,
    #[serde(default)]
    pub message_template: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigureResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleQuery {
    pub guild_id: GuildId,
    pub enabled: bool,
}

/// `GET /api/events/invites/{guild_id}/stats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteStats {
    #[serde(default)]
    pub total_invites: u64,
    #[serde(default)]
    pub total_uses: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub total_points: i64,
}

/// `GET /api/events/invites/{guild_id}/leaderboard?limit=N`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    #[serde(default)]
    pub leaderboard: Vec<LeaderboardEntry>,
}
