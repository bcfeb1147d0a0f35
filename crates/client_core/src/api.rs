//! Backend HTTP surface consumed by the dashboard.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::GuildId,
    error::{BackendRejection, ErrorDetail},
    protocol::{
        BotStatus, Channel, ChannelListResponse, ConfigureResponse, DashboardConfig,
        EmbedMessageRequest, InviteStats, JoinConfig, JoinDmConfig, LeaderboardEntry,
        LeaderboardResponse, LeaveConfig, MessageSendResponse, SendMessageRequest, ToggleQuery,
    },
};
use tracing::debug;

use crate::error::Result;

/// Which member-event configuration an endpoint addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Join,
    Leave,
    JoinDm,
}

impl EventKind {
    pub fn path_segment(self) -> &'static str {
        match self {
            EventKind::Join => "join",
            EventKind::Leave => "leave",
            EventKind::JoinDm => "join-dm",
        }
    }
}

#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn fetch_config(&self) -> Result<DashboardConfig>;
    async fn bot_status(&self) -> Result<BotStatus>;
    async fn list_channels(&self, guild_id: &GuildId) -> Result<Vec<Channel>>;
    async fn send_message(&self, request: &SendMessageRequest) -> Result<MessageSendResponse>;
    async fn send_embed(&self, request: &EmbedMessageRequest) -> Result<MessageSendResponse>;
    async fn join_config(&self, guild_id: &GuildId) -> Result<Option<JoinConfig>>;
    async fn configure_join(&self, config: &JoinConfig) -> Result<ConfigureResponse>;
    async fn toggle_join(&self, guild_id: &GuildId, enabled: bool) -> Result<()>;
    async fn leave_config(&self, guild_id: &GuildId) -> Result<Option<LeaveConfig>>;
    async fn configure_leave(&self, config: &LeaveConfig) -> Result<ConfigureResponse>;
    async fn join_dm_config(&self, guild_id: &GuildId) -> Result<Option<JoinDmConfig>>;
    async fn configure_join_dm(&self, config: &JoinDmConfig) -> Result<ConfigureResponse>;
    async fn invite_stats(&self, guild_id: &GuildId) -> Result<InviteStats>;
    async fn invite_leaderboard(
        &self,
        guild_id: &GuildId,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>>;
}

/// `DashboardApi` over the backend's JSON HTTP endpoints.
pub struct HttpDashboardApi {
    http: Client,
    base_url: String,
}

impl HttpDashboardApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(path, "GET");
        let response = self.http.get(self.url(path)).send().await?;
        decode(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        debug!(path, "POST");
        let response = self.http.post(self.url(path)).json(body).send().await?;
        decode(response).await
    }

    async fn stored_config<T: DeserializeOwned>(
        &self,
        kind: EventKind,
        guild_id: &GuildId,
    ) -> Result<Option<T>> {
        let body: Value = self
            .get_json(&format!("/api/events/{}/{guild_id}", kind.path_segment()))
            .await?;
        stored_config_from_value(body)
    }
}

/// The events endpoints answer `{}` for a guild with nothing stored yet.
fn stored_config_from_value<T: DeserializeOwned>(body: Value) -> Result<Option<T>> {
    match body.get("guild_id") {
        None | Some(Value::Null) => Ok(None),
        Some(_) => Ok(Some(serde_json::from_value(body)?)),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        let detail: ErrorDetail = serde_json::from_slice(&body).unwrap_or_default();
        return Err(BackendRejection::from_body(status.as_u16(), &detail).into());
    }
    Ok(serde_json::from_slice(&body)?)
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn fetch_config(&self) -> Result<DashboardConfig> {
        self.get_json("/api/config").await
    }

    async fn bot_status(&self) -> Result<BotStatus> {
        self.get_json("/api/bot/status").await
    }

    async fn list_channels(&self, guild_id: &GuildId) -> Result<Vec<Channel>> {
        let body: ChannelListResponse = self
            .get_json(&format!("/api/channels/{guild_id}"))
            .await?;
        Ok(body.channels)
    }

    async fn send_message(&self, request: &SendMessageRequest) -> Result<MessageSendResponse> {
        self.post_json("/api/message/send", request).await
    }

    async fn send_embed(&self, request: &EmbedMessageRequest) -> Result<MessageSendResponse> {
        self.post_json("/api/message/embed", request).await
    }

    async fn join_config(&self, guild_id: &GuildId) -> Result<Option<JoinConfig>> {
        self.stored_config(EventKind::Join, guild_id).await
    }

    async fn configure_join(&self, config: &JoinConfig) -> Result<ConfigureResponse> {
        self.post_json("/api/events/join/configure", config).await
    }

    async fn toggle_join(&self, guild_id: &GuildId, enabled: bool) -> Result<()> {
        let query = ToggleQuery {
            guild_id: guild_id.clone(),
            enabled,
        };
        let response = self
            .http
            .post(self.url("/api/events/join/toggle"))
            .query(&query)
            .send()
            .await?;
        let _: Value = decode(response).await?;
        Ok(())
    }

    async fn leave_config(&self, guild_id: &GuildId) -> Result<Option<LeaveConfig>> {
        self.stored_config(EventKind::Leave, guild_id).await
    }

    async fn configure_leave(&self, config: &LeaveConfig) -> Result<ConfigureResponse> {
        self.post_json("/api/events/leave/configure", config).await
    }

    async fn join_dm_config(&self, guild_id: &GuildId) -> Result<Option<JoinDmConfig>> {
        self.stored_config(EventKind::JoinDm, guild_id).await
    }

    async fn configure_join_dm(&self, config: &JoinDmConfig) -> Result<ConfigureResponse> {
        self.post_json("/api/events/join-dm/configure", config).await
    }

    async fn invite_stats(&self, guild_id: &GuildId) -> Result<InviteStats> {
        self.get_json(&format!("/api/events/invites/{guild_id}/stats"))
            .await
    }

    async fn invite_leaderboard(
        &self,
        guild_id: &GuildId,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>> {
        debug!(%guild_id, limit, "GET leaderboard");
        let response = self
            .http
            .get(self.url(&format!("/api/events/invites/{guild_id}/leaderboard")))
            .query(&[("limit", limit)])
            .send()
            .await?;
        let body: LeaderboardResponse = decode(response).await?;
        Ok(body.leaderboard)
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
