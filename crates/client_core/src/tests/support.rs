//! Scripted in-memory backend for state-machine tests.

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use tokio::sync::Notify;
use shared::{
    domain::{ChannelId, GuildId},
    error::BackendRejection,
    protocol::{
        BotStatus, Channel, ConfigureResponse, DashboardConfig, EmbedMessageRequest, InviteStats,
        JoinConfig, JoinDmConfig, LeaderboardEntry, LeaveConfig, MessageSendResponse,
        SendMessageRequest,
    },
};

use crate::{
    api::DashboardApi,
    error::{DashboardError, Result},
    lock,
};

pub(crate) struct Script<T> {
    replies: Mutex<VecDeque<Result<T>>>,
    calls: AtomicUsize,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl<T> Script<T> {
    pub(crate) fn push_ok(&self, value: T) -> &Self {
        lock(&self.replies).push_back(Ok(value));
        self
    }

    pub(crate) fn push_err(&self, err: DashboardError) -> &Self {
        lock(&self.replies).push_back(Err(err));
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self, endpoint: &str) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.replies)
            .pop_front()
            .unwrap_or_else(|| Err(DashboardError::Transport(format!("no scripted reply for {endpoint}"))))
    }
}

#[derive(Default)]
pub(crate) struct ScriptedApi {
    pub config: Script<DashboardConfig>,
    pub status: Script<BotStatus>,
    pub channels: Script<Vec<Channel>>,
    pub send: Script<MessageSendResponse>,
    pub embed: Script<MessageSendResponse>,
    pub join_config: Script<Option<JoinConfig>>,
    pub configure_join: Script<ConfigureResponse>,
    pub toggle_join: Script<()>,
    pub leave_config: Script<Option<LeaveConfig>>,
    pub configure_leave: Script<ConfigureResponse>,
    pub join_dm_config: Script<Option<JoinDmConfig>>,
    pub configure_join_dm: Script<ConfigureResponse>,
    pub invite_stats: Script<InviteStats>,
    pub leaderboard: Script<Vec<LeaderboardEntry>>,
    pub sent_messages: Mutex<Vec<SendMessageRequest>>,
    pub sent_embeds: Mutex<Vec<EmbedMessageRequest>>,
    pub saved_join: Mutex<Vec<JoinConfig>>,
    pub saved_leave: Mutex<Vec<LeaveConfig>>,
    pub saved_join_dm: Mutex<Vec<JoinDmConfig>>,
    pub leaderboard_limits: Mutex<Vec<u32>>,
    /// When set, message sends wait for a notification before answering.
    pub send_gate: Option<Arc<Notify>>,
    /// When set, the first channel fetch takes its reply and then waits for a
    /// notification before answering.
    pub channels_gate: Option<Arc<Notify>>,
}

impl ScriptedApi {
    pub(crate) fn network_calls(&self) -> usize {
        self.send.calls()
            + self.embed.calls()
            + self.configure_join.calls()
            + self.configure_leave.calls()
            + self.configure_join_dm.calls()
    }
}

pub(crate) fn channel(id: &str, name: &str, category: Option<&str>) -> Channel {
    Channel {
        id: ChannelId::from(id),
        name: name.to_string(),
        category: category.map(str::to_string),
    }
}

pub(crate) fn transport_error() -> DashboardError {
    DashboardError::Transport("connection refused".into())
}

pub(crate) fn rejection(status: u16, detail: &str) -> DashboardError {
    DashboardError::Backend(BackendRejection::new(status, detail))
}

pub(crate) fn sent_to(channel: &str) -> MessageSendResponse {
    MessageSendResponse {
        success: true,
        channel: Some(channel.to_string()),
        message_id: None,
        error: None,
    }
}

pub(crate) fn send_failed(error: &str) -> MessageSendResponse {
    MessageSendResponse {
        success: false,
        channel: None,
        message_id: None,
        error: Some(error.to_string()),
    }
}

#[async_trait]
impl DashboardApi for ScriptedApi {
    async fn fetch_config(&self) -> Result<DashboardConfig> {
        self.config.next("config")
    }

    async fn bot_status(&self) -> Result<BotStatus> {
        self.status.next("bot status")
    }

    async fn list_channels(&self, _guild_id: &GuildId) -> Result<Vec<Channel>> {
        let reply = self.channels.next("channels");
        if let Some(gate) = self.channels_gate.as_ref().filter(|_| self.channels.calls() == 1) {
            gate.notified().await;
        }
        reply
    }

    async fn send_message(&self, request: &SendMessageRequest) -> Result<MessageSendResponse> {
        lock(&self.sent_messages).push(request.clone());
        if let Some(gate) = &self.send_gate {
            gate.notified().await;
        }
        self.send.next("message send")
    }

    async fn send_embed(&self, request: &EmbedMessageRequest) -> Result<MessageSendResponse> {
        lock(&self.sent_embeds).push(request.clone());
        self.embed.next("message embed")
    }

    async fn join_config(&self, _guild_id: &GuildId) -> Result<Option<JoinConfig>> {
        self.join_config.next("join config")
    }

    async fn configure_join(&self, config: &JoinConfig) -> Result<ConfigureResponse> {
        lock(&self.saved_join).push(config.clone());
        self.configure_join.next("join configure")
    }

    async fn toggle_join(&self, _guild_id: &GuildId, _enabled: bool) -> Result<()> {
        self.toggle_join.next("join toggle")
    }

    async fn leave_config(&self, _guild_id: &GuildId) -> Result<Option<LeaveConfig>> {
        self.leave_config.next("leave config")
    }

    async fn configure_leave(&self, config: &LeaveConfig) -> Result<ConfigureResponse> {
        lock(&self.saved_leave).push(config.clone());
        self.configure_leave.next("leave configure")
    }

    async fn join_dm_config(&self, _guild_id: &GuildId) -> Result<Option<JoinDmConfig>> {
        self.join_dm_config.next("join-dm config")
    }

    async fn configure_join_dm(&self, config: &JoinDmConfig) -> Result<ConfigureResponse> {
        lock(&self.saved_join_dm).push(config.clone());
        self.configure_join_dm.next("join-dm configure")
    }

    async fn invite_stats(&self, _guild_id: &GuildId) -> Result<InviteStats> {
        self.invite_stats.next("invite stats")
    }

    async fn invite_leaderboard(
        &self,
        _guild_id: &GuildId,
        limit: u32,
    ) -> Result<Vec<LeaderboardEntry>> {
        lock(&self.leaderboard_limits).push(limit);
        self.leaderboard.next("invite leaderboard")
    }
}
